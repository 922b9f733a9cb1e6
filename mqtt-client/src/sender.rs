use crate::{REQUEST_CAPACITY, envelope::Envelope, error::MqttError, options};
use rumqttc::{AsyncClient, EventLoop, QoS};
use std::time::Duration;

const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Publishes frame envelopes to the broker.
///
/// Requests are only queued here; nothing reaches the broker unless the
/// [`EventLoop`] returned by [`MqttSender::new`] is driven, see [`run`].
pub struct MqttSender {
    client: AsyncClient,
}

impl MqttSender {
    pub fn new(host: &str, port: u16, keep_alive: Duration) -> (Self, EventLoop) {
        let options = options("eavesdropper-gather", host, port, keep_alive);
        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);

        (Self { client }, eventloop)
    }

    pub fn from_client(client: AsyncClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> AsyncClient {
        self.client.clone()
    }

    pub async fn publish(&self, topic: &str, envelope: &Envelope) -> Result<(), MqttError> {
        self.client
            .publish(topic, QoS::AtLeastOnce, false, envelope.to_json()?)
            .await?;

        log::trace!("Published {} to topic: {}", envelope.frame, topic);
        Ok(())
    }

    /// Queues the envelope without waiting, for use from synchronous frame
    /// callbacks. Fails if the request queue is full or the event loop is gone.
    pub fn try_publish(&self, topic: &str, envelope: &Envelope) -> Result<(), MqttError> {
        self.client
            .try_publish(topic, QoS::AtLeastOnce, false, envelope.to_json()?)?;

        log::trace!("Queued {} for topic: {}", envelope.frame, topic);
        Ok(())
    }
}

/// Drives the event loop of a sender until the task is dropped.
///
/// Connection errors are logged and retried; rumqttc reconnects on the next
/// poll.
pub async fn run(mut eventloop: EventLoop) {
    loop {
        match eventloop.poll().await {
            Ok(event) => log::trace!("MQTT event: {:?}", event),
            Err(e) => {
                log::warn!("MQTT connection error: {}", e);
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}
