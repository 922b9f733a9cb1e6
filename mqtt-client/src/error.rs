use thiserror::Error;

#[derive(Error, Debug)]
pub enum MqttError {
    /// The request could not be queued for the event loop
    #[error("MQTT request failed: {0}")]
    Client(#[from] rumqttc::ClientError),

    /// The event loop lost or could not establish the broker connection
    #[error("MQTT connection error: {0}")]
    Connection(#[from] rumqttc::ConnectionError),

    #[error("Invalid frame envelope: {0}")]
    Decode(#[from] serde_json::Error),
}
