use crate::{REQUEST_CAPACITY, envelope::Envelope, error::MqttError, options};
use rumqttc::{
    AsyncClient,
    Event::{Incoming, Outgoing},
    EventLoop, QoS,
    Packet::{ConnAck, Publish},
};
use std::time::Duration;

/// Receives frame envelopes published on the session.
///
/// Subscriptions are remembered and renewed every time the connection is
/// acknowledged, so nothing is queued while the broker is unreachable.
pub struct MqttReceiver {
    client: AsyncClient,
    eventloop: EventLoop,
    topics: Vec<String>,
    connected: bool,
}

impl MqttReceiver {
    pub fn new(host: &str, port: u16, keep_alive: Duration) -> Self {
        let options = options("eavesdropper-log", host, port, keep_alive);
        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);

        Self::from_client(client, eventloop)
    }

    pub fn from_client(client: AsyncClient, eventloop: EventLoop) -> Self {
        Self {
            client,
            eventloop,
            topics: Vec::new(),
            connected: false,
        }
    }

    pub fn client(&self) -> AsyncClient {
        self.client.clone()
    }

    /// Subscribes to `topic` for the lifetime of the receiver.
    ///
    /// While disconnected the topic is only recorded; the subscription is
    /// sent once [`recv`](MqttReceiver::recv) gets the connection
    /// acknowledged.
    pub async fn subscribe(&mut self, topic: &str) -> Result<(), MqttError> {
        if self.topics.iter().any(|t| t == topic) {
            return Ok(());
        }
        self.topics.push(topic.to_string());

        if self.connected {
            self.client.subscribe(topic, QoS::AtLeastOnce).await?;
        }
        log::info!("Subscribed to topic: {}", topic);
        Ok(())
    }

    /// Waits for the next envelope.
    ///
    /// Publishes that do not carry an envelope are logged and skipped. A
    /// connection error is returned as is; calling `recv` again reconnects
    /// and renews the subscriptions.
    pub async fn recv(&mut self) -> Result<Envelope, MqttError> {
        loop {
            let event = match self.eventloop.poll().await {
                Ok(event) => event,
                Err(e) => {
                    self.connected = false;
                    return Err(e.into());
                }
            };

            match event {
                Incoming(Publish(msg)) => match Envelope::from_json(&msg.payload) {
                    Ok(envelope) => return Ok(envelope),
                    Err(e) => log::warn!("Dropping message on {}: {}", msg.topic, e),
                },
                Incoming(ConnAck(ack)) => {
                    log::debug!("Connected: {:?}", ack);
                    self.connected = true;
                    self.renew_subscriptions();
                }
                Incoming(pk) => log::trace!("Incoming event: {:?}", pk),
                Outgoing(ev) => log::trace!("Outgoing event: {:?}", ev),
            }
        }
    }

    pub async fn close(&self) -> Result<(), MqttError> {
        self.client.disconnect().await?;
        Ok(())
    }

    // The event loop is the caller here, so the request must not wait for
    // room in the channel.
    fn renew_subscriptions(&self) {
        for topic in &self.topics {
            if let Err(e) = self.client.try_subscribe(topic.as_str(), QoS::AtLeastOnce) {
                log::warn!("Failed to renew subscription to {}: {}", topic, e);
            }
        }
    }
}
