//! # Completion Consumer
//!
//! Drains the completion topic and reconciles each result with the order store and the
//! waiter registry, in that order: the store is written before any waiter is woken, so a
//! woken caller never reads a stale `pending` record.
//!
//! A single bad message is logged and dropped; the loop only ends when the subscription
//! closes or shutdown is signalled.

use crate::broker::{BrokerMessage, CompletionMessage, Subscription};
use crate::clients::OrderClient;
use crate::model::{OrderId, OrderStatus};
use crate::order_actor::OrderError;
use crate::registry::PendingWaiterRegistry;
use chrono::Utc;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// What happened to one delivered message.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// Persisted and a suspended caller was woken.
    Resolved(OrderId, OrderStatus),
    /// Persisted (or already terminal) with nobody waiting.
    Persisted(OrderId, OrderStatus),
    Dropped(DropReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    /// Payload was not a completion message.
    Malformed(String),
    /// Status was not `completed` or `failed`.
    UnknownStatus(String),
    /// No such order in this store.
    UnknownOrder(OrderId),
    /// The store rejected the update.
    Store(String),
}

pub struct CompletionConsumer {
    orders: OrderClient,
    registry: PendingWaiterRegistry,
}

impl CompletionConsumer {
    pub fn new(orders: OrderClient, registry: PendingWaiterRegistry) -> Self {
        Self { orders, registry }
    }

    /// Processes messages until the subscription ends or `shutdown` fires.
    ///
    /// On shutdown the subscription stops accepting messages and whatever is already
    /// queued is still handled.
    pub async fn run(self, mut subscription: Subscription, mut shutdown: oneshot::Receiver<()>) {
        let topic = subscription.topic().to_string();
        info!(%topic, "Completion consumer started");
        let mut handled = 0u64;

        loop {
            tokio::select! {
                message = subscription.recv() => match message {
                    Some(message) => {
                        self.handle(&message).await;
                        handled += 1;
                    }
                    None => break,
                },
                _ = &mut shutdown => {
                    subscription.close();
                    while let Some(message) = subscription.recv().await {
                        self.handle(&message).await;
                        handled += 1;
                    }
                    break;
                }
            }
        }

        info!(%topic, handled, "Completion consumer stopped");
    }

    /// Reconciles one message with the store, then the registry.
    pub async fn handle(&self, message: &BrokerMessage) -> Delivery {
        let completion = match CompletionMessage::decode(&message.payload) {
            Ok(completion) => completion,
            Err(e) => {
                warn!(topic = %message.topic, error = %e, "Dropping malformed completion message");
                return Delivery::Dropped(DropReason::Malformed(e.to_string()));
            }
        };
        let order_id = completion.order_id;

        let status = match completion.status.parse::<OrderStatus>() {
            Ok(status) if status.is_terminal() => status,
            _ => {
                warn!(%order_id, status = %completion.status, "Dropping completion with unrecognized status");
                return Delivery::Dropped(DropReason::UnknownStatus(completion.status));
            }
        };
        debug!(%order_id, %status, "Completion received");

        let stored = match self
            .orders
            .set_terminal(order_id.clone(), status, Utc::now())
            .await
        {
            Ok((order, applied)) => {
                if !applied {
                    debug!(%order_id, stored = %order.status, "Order already settled, store unchanged");
                }
                order.status
            }
            Err(OrderError::NotFound(_)) => {
                warn!(%order_id, "Dropping completion for unknown order");
                return Delivery::Dropped(DropReason::UnknownOrder(order_id));
            }
            Err(e) => {
                error!(%order_id, error = %e, "Failed to persist completion");
                return Delivery::Dropped(DropReason::Store(e.to_string()));
            }
        };

        // wake with what the store holds, which differs from `status` on a late duplicate
        if self.registry.resolve(&order_id, stored) {
            Delivery::Resolved(order_id, stored)
        } else {
            Delivery::Persisted(order_id, stored)
        }
    }
}
