//! MQTT transport over `rumqttc`
//!
//! Every publish and subscription uses QoS 2. The event loop is driven by
//! [`pump`], which forwards connections and inbound publishes to the bridge.

use std::time::Duration;

use async_trait::async_trait;
use halux_core::{CoreError, InboundMessage, Transport, TransportEvent};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::MqttConfig;

const KEEP_ALIVE: Duration = Duration::from_secs(60);
const REQUEST_CAPACITY: usize = 64;

/// Bus handle used by the bridge
pub struct MqttTransport {
    client: AsyncClient,
}

impl MqttTransport {
    /// Disconnect from the broker, ignoring a loop that is already gone
    pub async fn disconnect(&self) {
        if let Err(e) = self.client.disconnect().await {
            debug!(error = %e, "disconnect request dropped");
        }
    }
}

#[async_trait]
impl Transport for MqttTransport {
    async fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<(), CoreError> {
        debug!(topic = %topic, bytes = payload.len(), retain, "publish");
        self.client
            .publish(topic, QoS::ExactlyOnce, retain, payload)
            .await
            .map_err(|e| CoreError::Transport(e.to_string()))
    }

    async fn subscribe(&self, topic: &str) -> Result<(), CoreError> {
        self.client
            .subscribe(topic, QoS::ExactlyOnce)
            .await
            .map_err(|e| CoreError::Transport(e.to_string()))
    }
}

/// Build the client and its event loop.
///
/// Nothing touches the network until the event loop is polled.
pub fn connect(config: &MqttConfig) -> (MqttTransport, EventLoop) {
    let mut options = MqttOptions::new(
        format!("halux-{}", config.id),
        config.host.clone(),
        config.port,
    );
    options.set_keep_alive(KEEP_ALIVE);
    if let Some(username) = &config.username {
        options.set_credentials(
            username.clone(),
            config.password.clone().unwrap_or_default(),
        );
    }

    info!(host = %config.host, port = config.port, "MQTT connecting");

    let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
    (MqttTransport { client }, eventloop)
}

/// Drive the event loop, forwarding events until the bridge goes away.
///
/// # Errors
/// Any connection error is returned; the daemon does not reconnect
pub async fn pump(mut eventloop: EventLoop, events: mpsc::Sender<TransportEvent>) -> eyre::Result<()> {
    loop {
        let event = match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("MQTT connected");
                TransportEvent::Connected
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                debug!(topic = %publish.topic, "message received");
                TransportEvent::Message(InboundMessage::new(publish.topic, publish.payload.to_vec()))
            }
            Ok(_) => continue,
            Err(e) => return Err(eyre::eyre!("MQTT connection failed: {e}")),
        };

        if events.send(event).await.is_err() {
            debug!("bridge gone, stopping event loop");
            return Ok(());
        }
    }
}
