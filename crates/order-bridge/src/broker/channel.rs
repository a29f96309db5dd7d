//! In-process broker for standalone mode.
//!
//! Every subscription owns a bounded mpsc queue; publishing fans a copy out to each live
//! queue of the topic. A full queue applies back-pressure up to the publish timeout.

use super::{BrokerError, BrokerMessage, MessageBroker, Result, Subscription};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Default per-subscription queue capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Default time a publish waits on a full subscriber queue.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_millis(1000);

/// In-memory broker. Clones share the same topics.
#[derive(Clone)]
pub struct ChannelBroker {
    inner: Arc<Inner>,
}

struct Inner {
    topics: DashMap<String, Vec<mpsc::Sender<BrokerMessage>>>,
    capacity: usize,
    publish_timeout: Duration,
    closed: AtomicBool,
}

impl Default for ChannelBroker {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY, DEFAULT_PUBLISH_TIMEOUT)
    }
}

impl ChannelBroker {
    pub fn new(capacity: usize, publish_timeout: Duration) -> Self {
        info!(capacity, ?publish_timeout, "Channel broker initialized");
        Self {
            inner: Arc::new(Inner {
                topics: DashMap::new(),
                capacity: capacity.max(1),
                publish_timeout,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Refuses further publishes and ends every open subscription.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.topics.clear();
        info!("Channel broker closed");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Live subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.inner
            .topics
            .get(topic)
            .map(|senders| senders.iter().filter(|s| !s.is_closed()).count())
            .unwrap_or(0)
    }

    fn live_senders(&self, topic: &str) -> Vec<mpsc::Sender<BrokerMessage>> {
        match self.inner.topics.get_mut(topic) {
            Some(mut senders) => {
                senders.retain(|s| !s.is_closed());
                senders.clone()
            }
            None => Vec::new(),
        }
    }
}

#[async_trait]
impl MessageBroker for ChannelBroker {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        if self.is_closed() {
            return Err(BrokerError::Unavailable("broker is closed".into()));
        }

        // the map guard is released before any await
        let senders = self.live_senders(topic);
        if senders.is_empty() {
            return Err(BrokerError::Unavailable(format!(
                "no subscribers for topic '{topic}'"
            )));
        }

        // every queue must have room before any of them receives the message
        let reserve_all = async {
            let mut permits = Vec::with_capacity(senders.len());
            for sender in &senders {
                match sender.reserve().await {
                    Ok(permit) => permits.push(permit),
                    Err(_) => debug!(topic, "Subscriber went away during publish"),
                }
            }
            permits
        };
        let permits = match tokio::time::timeout(self.inner.publish_timeout, reserve_all).await {
            Ok(permits) => permits,
            Err(_) => {
                warn!(topic, "Publish timed out on a full subscriber queue");
                return Err(BrokerError::PublishTimeout {
                    topic: topic.to_string(),
                });
            }
        };

        let message = BrokerMessage {
            topic: topic.to_string(),
            payload,
        };
        let delivered = permits.len();
        for permit in permits {
            permit.send(message.clone());
        }

        if delivered == 0 {
            return Err(BrokerError::Unavailable(format!(
                "no subscribers for topic '{topic}'"
            )));
        }
        debug!(topic, delivered, "Published");
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<Subscription> {
        if self.is_closed() {
            return Err(BrokerError::Subscribe("broker is closed".into()));
        }

        let (sender, receiver) = mpsc::channel(self.inner.capacity);
        let mut senders = self.inner.topics.entry(topic.to_string()).or_default();
        senders.retain(|s| !s.is_closed());
        senders.push(sender);
        drop(senders);
        info!(topic, "Subscribed");
        Ok(Subscription::new(topic, receiver))
    }
}
