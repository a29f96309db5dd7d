//! Represents a customer order.
//!
//! # Actor Framework
//! This struct implements the [`ActorEntity`](resource_actor::ActorEntity) trait,
//! allowing it to be managed by a [`ResourceActor`](resource_actor::ResourceActor).
//!
//! An order is created `pending` and moves at most once to `completed` or `failed`
//! through [`OrderAction::SetTerminal`](crate::order_actor::OrderAction::SetTerminal).
use crate::model::{LineItem, ProductId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Type-safe identifier for Orders. Doubles as the correlation id on the broker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// A fresh, globally unique id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Failed,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown order status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "failed" => Ok(OrderStatus::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub line_items: Vec<LineItem>,
    pub total_price: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Product ids in the order they were requested, duplicates included.
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.line_items
            .iter()
            .map(|item| item.product_id.clone())
            .collect()
    }
}

/// Payload for creating a new order from already-resolved line items.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub line_items: Vec<LineItem>,
}

/// The caller-facing shape of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub status: OrderStatus,
    pub products: Vec<ProductId>,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            products: order.product_ids(),
            id: order.id,
            status: order.status,
            total_price: order.total_price,
            created_at: order.created_at,
            completed_at: order.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_wire_values_only() {
        assert_eq!("completed".parse::<OrderStatus>(), Ok(OrderStatus::Completed));
        assert_eq!("failed".parse::<OrderStatus>(), Ok(OrderStatus::Failed));
        assert_eq!("pending".parse::<OrderStatus>(), Ok(OrderStatus::Pending));
        assert_eq!(
            "COMPLETED".parse::<OrderStatus>(),
            Err(UnknownStatus("COMPLETED".into()))
        );
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
    }

    #[test]
    fn view_serializes_camel_case_with_lowercase_status() {
        let order = Order {
            id: OrderId::from("o-1"),
            line_items: vec![
                LineItem {
                    product_id: ProductId::from("p1"),
                    price: 10.0,
                },
                LineItem {
                    product_id: ProductId::from("p1"),
                    price: 10.0,
                },
            ],
            total_price: 20.0,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        };

        let json = serde_json::to_value(OrderView::from(order)).unwrap();
        assert_eq!(json["id"], "o-1");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["totalPrice"], 20.0);
        assert_eq!(json["products"], serde_json::json!(["p1", "p1"]));
        assert!(json.get("completedAt").is_none());
    }
}
