//! Pub/sub session for raw NMEA 2000 frames.
//!
//! Gatherers publish every assembled frame as an [`Envelope`] on the session
//! [`topic`], loggers subscribe to it.

pub mod envelope;
pub mod error;
pub mod receiver;
pub mod sender;

pub use envelope::{Envelope, topic};
pub use error::MqttError;

use rumqttc::MqttOptions;
use std::time::Duration;
use uuid::Uuid;

// Requests queued between the client and its event loop. Frames arrive in
// bursts, so this is well above rumqttc's usual 10.
const REQUEST_CAPACITY: usize = 1024;

fn options(prefix: &str, host: &str, port: u16, keep_alive: Duration) -> MqttOptions {
    let client_id = format!("{}-{}", prefix, Uuid::new_v4());
    let mut options = MqttOptions::new(client_id, host, port);
    options.set_keep_alive(keep_alive);
    options
}
