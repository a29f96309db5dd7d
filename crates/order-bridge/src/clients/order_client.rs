//! # Order Client
//!
//! High-level API for the `Order` actor, the durable side of the bridge.
use crate::model::{Order, OrderCreate, OrderId, OrderStatus};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use resource_actor::{ActorClient, FrameworkError, ResourceClient};
use tracing::{debug, instrument};

/// Client for interacting with the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    /// Stores a new `pending` order and returns it.
    #[instrument(skip(self))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<Order, OrderError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.get(id.clone())
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    /// Moves a `pending` order to `status`.
    ///
    /// Returns the stored record and whether this call performed the transition. When the
    /// order is already terminal the record comes back unchanged with `false`.
    #[instrument(skip(self))]
    pub async fn set_terminal(
        &self,
        id: OrderId,
        status: OrderStatus,
        completed_at: DateTime<Utc>,
    ) -> Result<(Order, bool), OrderError> {
        let action = OrderAction::SetTerminal {
            status,
            completed_at,
        };
        match self.inner.perform_action(id, action).await {
            Ok(OrderActionResult::SetTerminal { order, applied }) => Ok((order, applied)),
            Err(e) => Err(Self::map_error(e)),
        }
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::DuplicateId(id) => OrderError::DuplicateId(id),
            other => other
                .into_entity_error::<OrderError>()
                .unwrap_or_else(|e| OrderError::ActorCommunicationError(e.to_string())),
        }
    }
}
