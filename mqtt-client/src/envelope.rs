use crate::error::MqttError;
use chrono::{DateTime, Utc};
use nmea2000::Frame;
use serde::{Deserialize, Serialize};

/// A frame as it travels over the session.
///
/// ## Fields
/// - `sample_time_us`: Capture time of the chunk that completed the frame, in
///   microseconds since the Unix epoch.
/// - `sender_stamp`: Identification id of the publishing gatherer.
/// - `frame`: The raw frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub sample_time_us: i64,
    pub sender_stamp: u16,
    pub frame: Frame,
}

impl Envelope {
    pub fn new(frame: Frame, sample_time: &DateTime<Utc>, sender_stamp: u16) -> Self {
        Self {
            sample_time_us: sample_time.timestamp_micros(),
            sender_stamp,
            frame,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, MqttError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, MqttError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Topic carrying the raw frames of a session.
pub fn topic(session: u16) -> String {
    format!("session/{}/nmea2000/raw", session)
}
