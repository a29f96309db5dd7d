//! Mock broker for testing.
//!
//! Behaves like an in-process broker that never runs out of subscribers, records every
//! publish, can be told to fail, and lets a test inject raw payloads (duplicates, garbage,
//! unknown ids) straight into a topic's subscriptions.

use super::{BrokerError, BrokerMessage, MessageBroker, Result, Subscription};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

const MOCK_CHANNEL_CAPACITY: usize = 64;

/// Mock broker. Clones share state.
#[derive(Clone, Default)]
pub struct MockBroker {
    inner: Arc<MockInner>,
}

#[derive(Default)]
struct MockInner {
    published: RwLock<Vec<BrokerMessage>>,
    fail_on_publish: RwLock<bool>,
    subscribers: RwLock<HashMap<String, Vec<mpsc::Sender<BrokerMessage>>>>,
}

impl MockBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_publish(&self, fail: bool) {
        *self.inner.fail_on_publish.write().await = fail;
    }

    pub async fn published_count(&self) -> usize {
        self.inner.published.read().await.len()
    }

    pub async fn published_on(&self, topic: &str) -> Vec<BrokerMessage> {
        self.inner
            .published
            .read()
            .await
            .iter()
            .filter(|m| m.topic == topic)
            .cloned()
            .collect()
    }

    pub async fn take_published(&self) -> Vec<BrokerMessage> {
        std::mem::take(&mut *self.inner.published.write().await)
    }

    /// Delivers `payload` to every subscription on `topic` without recording it.
    ///
    /// Returns how many subscriptions received it.
    pub async fn inject(&self, topic: &str, payload: Vec<u8>) -> usize {
        let senders = self
            .inner
            .subscribers
            .read()
            .await
            .get(topic)
            .cloned()
            .unwrap_or_default();

        let message = BrokerMessage {
            topic: topic.to_string(),
            payload,
        };
        let mut delivered = 0;
        for sender in senders {
            if sender.send(message.clone()).await.is_ok() {
                delivered += 1;
            }
        }
        delivered
    }
}

#[async_trait]
impl MessageBroker for MockBroker {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        if *self.inner.fail_on_publish.read().await {
            return Err(BrokerError::Unavailable("Mock publish failure".to_string()));
        }
        self.inner.published.write().await.push(BrokerMessage {
            topic: topic.to_string(),
            payload: payload.clone(),
        });
        self.inject(topic, payload).await;
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<Subscription> {
        let (sender, receiver) = mpsc::channel(MOCK_CHANNEL_CAPACITY);
        self.inner
            .subscribers
            .write()
            .await
            .entry(topic.to_string())
            .or_default()
            .push(sender);
        Ok(Subscription::new(topic, receiver))
    }
}
