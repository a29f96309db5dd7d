//! Simulated downstream fulfillment.
//!
//! Stands in for the inventory/payment process on the far side of the broker: it takes
//! fulfillment requests off the request topic and answers each on the completion topic.
//! Used by the demo binary and by end-to-end tests.

use crate::broker::{CompletionMessage, FulfillmentRequest, MessageBroker, Subscription};
use crate::model::OrderStatus;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct FulfillmentWorker {
    broker: Arc<dyn MessageBroker>,
    completion_topic: String,
    delay: Duration,
    outcome: OrderStatus,
}

impl FulfillmentWorker {
    /// A worker that completes every order immediately.
    pub fn new(broker: Arc<dyn MessageBroker>, completion_topic: impl Into<String>) -> Self {
        Self {
            broker,
            completion_topic: completion_topic.into(),
            delay: Duration::ZERO,
            outcome: OrderStatus::Completed,
        }
    }

    /// Waits this long before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Answers every request with `outcome`.
    pub fn with_outcome(mut self, outcome: OrderStatus) -> Self {
        self.outcome = outcome;
        self
    }

    /// Answers requests until the subscription ends. Returns how many were answered.
    pub async fn run(self, mut requests: Subscription) -> usize {
        info!(topic = requests.topic(), "Fulfillment worker started");
        let mut answered = 0;

        while let Some(message) = requests.recv().await {
            let request = match FulfillmentRequest::decode(&message.payload) {
                Ok(request) => request,
                Err(e) => {
                    warn!(error = %e, "Skipping malformed fulfillment request");
                    continue;
                }
            };
            debug!(order_id = %request.order_id, items = request.line_items.len(), "Fulfilling");

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let reply = CompletionMessage::new(request.order_id.clone(), self.outcome.as_str());
            let published = match reply.encode() {
                Ok(payload) => self.broker.publish(&self.completion_topic, payload).await,
                Err(e) => Err(e),
            };
            match published {
                Ok(()) => answered += 1,
                Err(e) => warn!(order_id = %request.order_id, error = %e, "Could not publish completion"),
            }
        }

        info!(answered, "Fulfillment worker stopped");
        answered
    }
}
