//! Order-specific actions.

use crate::model::{Order, OrderStatus};
use chrono::{DateTime, Utc};

/// Custom actions for Orders.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Compare-and-set from `pending` to a terminal status.
    SetTerminal {
        status: OrderStatus,
        completed_at: DateTime<Utc>,
    },
}

/// Results from Order actions.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderActionResult {
    /// The record after the action, and whether this call changed it.
    SetTerminal { order: Order, applied: bool },
}
