use std::time::Duration;

use chrono::Utc;
use mqtt_client::{Envelope, sender::MqttSender, topic};
use nmea2000::Frame;

const RECORDS: [&str; 3] = [
    "04:54:52.150 R 15FD080E 36 00 02 9F 73 FF FF FF",
    "04:54:52.151 R 15FD070E 36 C2 9F 73 FF 7F FB 03",
    "04:54:52.179 R 09F1120B B1 07 F2 00 00 FF 7F FD",
];

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    println!("Publishing frames to broker localhost:1883 on {}", topic(111));
    let (sender, eventloop) = MqttSender::new("127.0.0.1", 1883, Duration::from_secs(30));
    tokio::spawn(mqtt_client::sender::run(eventloop));

    for record in RECORDS {
        let Some(frame) = Frame::decode(record) else {
            continue;
        };

        sender
            .publish(&topic(111), &Envelope::new(frame, &Utc::now(), 1))
            .await
            .expect("Error sending message. Is the broker on?");
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
}
