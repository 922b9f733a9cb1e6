use std::time::Duration;

use mqtt_client::{receiver::MqttReceiver, topic};

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    println!("Listening on broker localhost:1883 for {}", topic(111));
    let mut receiver = MqttReceiver::new("127.0.0.1", 1883, Duration::from_secs(30));
    receiver
        .subscribe(&topic(111))
        .await
        .expect("Error connecting to mqtt. Is the broker on?");

    loop {
        match receiver.recv().await {
            Ok(envelope) => println!(
                "{} {} {}",
                envelope.sample_time_us, envelope.sender_stamp, envelope.frame
            ),
            Err(e) => {
                eprintln!("Receiver stopped: {}", e);
                break;
            }
        }
    }
}
