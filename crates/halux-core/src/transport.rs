//! Pub/sub transport seam
//!
//! The bridge publishes and subscribes through [`Transport`] and consumes
//! inbound traffic as a stream of [`TransportEvent`]s, so the broker client
//! lives outside this crate.

use async_trait::async_trait;

use crate::error::CoreError;

/// Outbound side of the pub/sub bus
#[async_trait]
pub trait Transport: Send + Sync {
    /// Publish `payload` to `topic`, retained if `retain` is set
    async fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<(), CoreError>;

    /// Start receiving messages published to `topic`
    async fn subscribe(&self, topic: &str) -> Result<(), CoreError>;
}

/// Inbound side of the pub/sub bus, delivered in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The broker accepted the (re)connection
    Connected,
    /// A message arrived on a subscribed topic
    Message(InboundMessage),
}

/// A message received on a subscribed topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Payload as text with invalid UTF-8 replaced and whitespace trimmed
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).trim().to_string()
    }
}
