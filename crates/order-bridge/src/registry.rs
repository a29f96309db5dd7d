//! # Pending Waiter Registry
//!
//! In-memory map from order id to the caller currently blocked on that order's completion.
//!
//! Every operation touches a single key of a sharded concurrent map; nothing ever locks or
//! iterates the whole registry. The race between a completion arriving and the caller's
//! deadline firing is settled by one atomic removal: whichever side removes the entry wins,
//! and the other observes its absence.
//!
//! ```rust
//! use order_bridge::model::{OrderId, OrderStatus};
//! use order_bridge::registry::PendingWaiterRegistry;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = PendingWaiterRegistry::new();
//!     let id = OrderId::from("o-1");
//!     let handle = registry.register(id.clone(), Duration::from_secs(5)).unwrap();
//!
//!     assert!(registry.resolve(&id, OrderStatus::Completed));
//!     assert_eq!(registry.await_result(handle).await, Ok(OrderStatus::Completed));
//!     assert!(registry.is_empty());
//! }
//! ```

use crate::model::{OrderId, OrderStatus};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A waiter for this order is already outstanding.
    #[error("A waiter is already registered for order {0}")]
    AlreadyRegistered(OrderId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WaitError {
    #[error("Deadline elapsed before the order completed")]
    TimedOut,

    #[error("Waiter was dropped without a result")]
    Abandoned,
}

struct Waiter {
    // tells this registration apart from a later one for the same id
    ticket: u64,
    sender: oneshot::Sender<OrderStatus>,
}

/// Owned, cloneable registry. Clones share the same waiters.
#[derive(Clone, Default)]
pub struct PendingWaiterRegistry {
    waiters: Arc<DashMap<OrderId, Waiter>>,
    next_ticket: Arc<AtomicU64>,
}

impl PendingWaiterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the single waiter for `order_id`, due `timeout` from now.
    pub fn register(
        &self,
        order_id: OrderId,
        timeout: Duration,
    ) -> Result<WaiterHandle, RegistryError> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();

        match self.waiters.entry(order_id.clone()) {
            Entry::Occupied(_) => {
                error!(%order_id, "Waiter already registered");
                return Err(RegistryError::AlreadyRegistered(order_id));
            }
            Entry::Vacant(slot) => {
                slot.insert(Waiter { ticket, sender });
            }
        }

        debug!(%order_id, ticket, ?timeout, "Waiter registered");
        Ok(WaiterHandle {
            order_id,
            ticket,
            deadline: Instant::now() + timeout,
            receiver,
            registry: self.clone(),
            settled: false,
        })
    }

    /// Wakes the waiter for `order_id` with `status`.
    ///
    /// Returns `false` when there is no waiter (already timed out, never registered) or it
    /// stopped listening. The caller is expected to have persisted `status` already.
    pub fn resolve(&self, order_id: &OrderId, status: OrderStatus) -> bool {
        match self.waiters.remove(order_id) {
            Some((_, waiter)) => {
                let woke = waiter.sender.send(status).is_ok();
                debug!(%order_id, %status, woke, "Waiter resolved");
                woke
            }
            None => {
                debug!(%order_id, %status, "No waiter to resolve");
                false
            }
        }
    }

    /// Suspends until the waiter is resolved or its deadline passes.
    ///
    /// On expiry the entry is removed here, so a later [`resolve`](Self::resolve) returns
    /// `false`. If `resolve` removed it first, its value is collected instead of timing out.
    pub async fn await_result(&self, handle: WaiterHandle) -> Result<OrderStatus, WaitError> {
        handle.wait().await
    }

    /// Number of outstanding waiters.
    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.waiters.contains_key(order_id)
    }

    /// Removes the entry only if it still belongs to `ticket`.
    fn remove_ticket(&self, order_id: &OrderId, ticket: u64) -> bool {
        self.waiters
            .remove_if(order_id, |_, waiter| waiter.ticket == ticket)
            .is_some()
    }
}

/// One registration, held by the suspended caller.
///
/// Dropping it unresolved (the caller's future was cancelled) removes its entry.
pub struct WaiterHandle {
    order_id: OrderId,
    ticket: u64,
    deadline: Instant,
    receiver: oneshot::Receiver<OrderStatus>,
    registry: PendingWaiterRegistry,
    settled: bool,
}

impl WaiterHandle {
    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    async fn wait(mut self) -> Result<OrderStatus, WaitError> {
        let outcome = match tokio::time::timeout_at(self.deadline, &mut self.receiver).await {
            Ok(Ok(status)) => Ok(status),
            Ok(Err(_)) => Err(WaitError::Abandoned),
            Err(_) => {
                if self.registry.remove_ticket(&self.order_id, self.ticket) {
                    debug!(order_id = %self.order_id, "Waiter timed out");
                    Err(WaitError::TimedOut)
                } else {
                    // resolve already took the entry; its send follows the removal
                    (&mut self.receiver).await.map_err(|_| WaitError::Abandoned)
                }
            }
        };
        self.settled = true;
        outcome
    }
}

impl Drop for WaiterHandle {
    fn drop(&mut self) {
        if !self.settled && self.registry.remove_ticket(&self.order_id, self.ticket) {
            debug!(order_id = %self.order_id, "Abandoned waiter removed");
        }
    }
}
