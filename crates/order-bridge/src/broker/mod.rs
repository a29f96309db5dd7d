//! Message broker seam.
//!
//! The bridge only needs two capabilities from a broker: fire a payload at a topic, and
//! receive every payload published to a topic. Delivery is at-least-once with no ordering
//! across topics, so consumers must tolerate duplicates.
//!
//! Each subscription is an explicit bounded channel drained by a dedicated task; there are
//! no handler callbacks. Implementations:
//! - [`ChannelBroker`]: in-process fan-out over `tokio::sync::mpsc`
//! - [`MockBroker`]: records publishes, injects messages, fails on demand

use async_trait::async_trait;
use tokio::sync::mpsc;

pub mod channel;
pub mod message;
pub mod mock;

pub use channel::ChannelBroker;
pub use message::{CompletionMessage, FulfillmentRequest};
pub use mock::MockBroker;

/// Result type for broker operations.
pub type Result<T> = std::result::Result<T, BrokerError>;

/// Errors that can occur during broker operations.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("Broker unavailable: {0}")]
    Unavailable(String),

    #[error("Publish to '{topic}' timed out")]
    PublishTimeout { topic: String },

    #[error("Subscribe failed: {0}")]
    Subscribe(String),

    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// A payload as delivered to a subscriber.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// The receiving end of one topic subscription.
///
/// Yields `None` once the broker drops its side (broker closed) or after [`close`](Self::close).
#[derive(Debug)]
pub struct Subscription {
    topic: String,
    receiver: mpsc::Receiver<BrokerMessage>,
}

impl Subscription {
    pub fn new(topic: impl Into<String>, receiver: mpsc::Receiver<BrokerMessage>) -> Self {
        Self {
            topic: topic.into(),
            receiver,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub async fn recv(&mut self) -> Option<BrokerMessage> {
        self.receiver.recv().await
    }

    /// Stops accepting new messages. Already queued messages are still returned.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

/// Publish/subscribe capability consumed by the order bridge.
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Hands `payload` to the broker for `topic`.
    ///
    /// Returns once the broker accepted the message; an error means nobody will see it.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()>;

    /// Opens a new subscription receiving every later publish to `topic`.
    async fn subscribe(&self, topic: &str) -> Result<Subscription>;
}
