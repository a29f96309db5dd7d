//! Entity trait implementation for the Order domain type.

use super::actions::{OrderAction, OrderActionResult};
use super::error::OrderError;
use crate::model::{Order, OrderCreate, OrderId, OrderStatus};
use async_trait::async_trait;
use chrono::Utc;
use resource_actor::ActorEntity;
use tracing::info;

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Context = ();
    type Error = OrderError;

    /// Builds a pending order priced from its line items.
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, Self::Error> {
        if params.line_items.is_empty() {
            return Err(OrderError::Validation(
                "an order needs at least one product".into(),
            ));
        }

        let total_price = params.line_items.iter().map(|item| item.price).sum();
        Ok(Self {
            id,
            line_items: params.line_items,
            total_price,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        })
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        _ctx: &Self::Context,
    ) -> Result<OrderActionResult, Self::Error> {
        match action {
            OrderAction::SetTerminal {
                status,
                completed_at,
            } => {
                if !status.is_terminal() {
                    return Err(OrderError::InvalidTransition {
                        from: self.status,
                        to: status,
                    });
                }

                // first write wins
                if self.status.is_terminal() {
                    return Ok(OrderActionResult::SetTerminal {
                        order: self.clone(),
                        applied: false,
                    });
                }

                self.status = status;
                self.completed_at = Some(completed_at);
                info!(order_id = %self.id, %status, "Order settled");
                Ok(OrderActionResult::SetTerminal {
                    order: self.clone(),
                    applied: true,
                })
            }
        }
    }
}
