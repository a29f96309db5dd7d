//! # Order Service
//!
//! Orchestrates one order through the bridge:
//!
//! 1. price every product id against the catalog
//! 2. store a `pending` order
//! 3. publish the fulfillment request
//! 4. register a waiter and suspend until a completion or the deadline
//! 5. answer with whatever the store holds
//!
//! A timeout is not an error: the caller gets the order back still `pending` and polls
//! [`OrderService::get_order_status`] later, while a late completion keeps updating the store.

use crate::auth::Principal;
use crate::broker::{FulfillmentRequest, MessageBroker};
use crate::clients::{OrderClient, ProductClient};
use crate::model::{OrderCreate, OrderId, OrderStatus, OrderView, ProductId};
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::registry::{PendingWaiterRegistry, WaitError};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderServiceError {
    /// Empty order or a product id the catalog does not know.
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    #[error("Order not found: {0}")]
    NotFound(String),

    /// The fulfillment request could not be published; the order was marked failed.
    #[error("Broker unavailable: {0}")]
    BrokerUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ProductError> for OrderServiceError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::InvalidProduct(id) | ProductError::NotFound(id) => {
                OrderServiceError::InvalidProduct(id)
            }
            other => OrderServiceError::Internal(other.to_string()),
        }
    }
}

impl From<OrderError> for OrderServiceError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotFound(id) => OrderServiceError::NotFound(id),
            other => OrderServiceError::Internal(other.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct OrderService {
    products: ProductClient,
    orders: OrderClient,
    broker: Arc<dyn MessageBroker>,
    registry: PendingWaiterRegistry,
    request_topic: String,
    order_timeout: Duration,
}

impl OrderService {
    pub fn new(
        products: ProductClient,
        orders: OrderClient,
        broker: Arc<dyn MessageBroker>,
        registry: PendingWaiterRegistry,
        request_topic: impl Into<String>,
        order_timeout: Duration,
    ) -> Self {
        Self {
            products,
            orders,
            broker,
            registry,
            request_topic: request_topic.into(),
            order_timeout,
        }
    }

    /// Places an order and waits, bounded by the order timeout, for its outcome.
    #[instrument(
        skip(self, product_ids, principal),
        fields(user = %principal.subject, items = product_ids.len(), order_id = tracing::field::Empty)
    )]
    pub async fn create_order(
        &self,
        product_ids: Vec<ProductId>,
        principal: &Principal,
    ) -> Result<OrderView, OrderServiceError> {
        if product_ids.is_empty() {
            return Err(OrderServiceError::InvalidProduct(
                "an order needs at least one product".into(),
            ));
        }

        let line_items = self.products.resolve_products(&product_ids).await?;
        let order = self
            .orders
            .create_order(OrderCreate {
                line_items: line_items.clone(),
            })
            .await?;
        let order_id = order.id.clone();
        tracing::Span::current().record("order_id", tracing::field::display(&order_id));
        info!(total_price = order.total_price, "Order created");

        let request = FulfillmentRequest {
            order_id: order_id.clone(),
            line_items,
        };
        if let Err(e) = self.publish(&request).await {
            warn!(error = %e, "Publish failed, marking order failed");
            if let Err(store_err) = self
                .orders
                .set_terminal(order_id.clone(), OrderStatus::Failed, Utc::now())
                .await
            {
                error!(error = %store_err, "Could not mark unpublished order failed");
            }
            return Err(OrderServiceError::BrokerUnavailable(e.to_string()));
        }

        let handle = self
            .registry
            .register(order_id.clone(), self.order_timeout)
            .map_err(|e| {
                error!(error = %e, "Waiter registration conflict");
                OrderServiceError::Internal(e.to_string())
            })?;

        // a completion may have landed between publish and register
        let current = self.orders.get_order(order_id.clone()).await?;
        if current.status.is_terminal() {
            drop(handle);
            info!(status = %current.status, "Order settled before waiting");
            return Ok(current.into());
        }

        match self.registry.await_result(handle).await {
            Ok(status) => debug!(%status, "Completion observed"),
            Err(WaitError::TimedOut) => {
                warn!(timeout = ?self.order_timeout, "No completion before deadline")
            }
            Err(WaitError::Abandoned) => warn!("Waiter abandoned"),
        }

        // the store is the source of truth, the waiter only said when to look
        let order = self.orders.get_order(order_id).await?;
        info!(status = %order.status, "Order answered");
        Ok(order.into())
    }

    /// Reads an order's current state without touching the registry.
    #[instrument(skip(self, principal), fields(user = %principal.subject))]
    pub async fn get_order_status(
        &self,
        order_id: OrderId,
        principal: &Principal,
    ) -> Result<OrderView, OrderServiceError> {
        Ok(self.orders.get_order(order_id).await?.into())
    }

    async fn publish(&self, request: &FulfillmentRequest) -> crate::broker::Result<()> {
        let payload = request.encode()?;
        self.broker.publish(&self.request_topic, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{MockBroker, Subscription};
    use crate::model::{Product, ProductCreate};
    use crate::{order_actor, product_actor};
    use resource_actor::mock::MockClient;
    use resource_actor::ActorClient;

    fn principal() -> Principal {
        Principal {
            subject: "test***".into(),
        }
    }

    fn service_with_mocked_catalog(
        catalog: &MockClient<Product>,
        broker: &MockBroker,
    ) -> (OrderService, OrderClient) {
        let (actor, orders) = order_actor::new(16);
        tokio::spawn(actor.run(()));
        let service = OrderService::new(
            ProductClient::new(catalog.client()),
            orders.clone(),
            Arc::new(broker.clone()),
            PendingWaiterRegistry::new(),
            "orders",
            Duration::from_millis(100),
        );
        (service, orders)
    }

    #[tokio::test]
    async fn test_empty_order_never_reaches_the_store() {
        let catalog = MockClient::<Product>::new();
        let broker = MockBroker::new();
        let (service, orders) = service_with_mocked_catalog(&catalog, &broker);

        let err = service.create_order(vec![], &principal()).await.unwrap_err();

        assert!(matches!(err, OrderServiceError::InvalidProduct(_)));
        assert!(orders.list().await.unwrap().is_empty());
        assert_eq!(broker.published_count().await, 0);
        catalog.verify();
    }

    #[tokio::test]
    async fn test_unknown_product_is_invalid() {
        let mut catalog = MockClient::<Product>::new();
        catalog.expect_get(ProductId::from("ghost")).return_ok(None);
        let broker = MockBroker::new();
        let (service, orders) = service_with_mocked_catalog(&catalog, &broker);

        let err = service
            .create_order(vec![ProductId::from("ghost")], &principal())
            .await
            .unwrap_err();

        assert_eq!(err, OrderServiceError::InvalidProduct("ghost".into()));
        assert!(orders.list().await.unwrap().is_empty());
        catalog.verify();
    }

    #[tokio::test]
    async fn test_publish_failure_marks_the_order_failed() {
        let (product_actor, products) = product_actor::new(16);
        tokio::spawn(product_actor.run(()));
        let product = products
            .create_product(ProductCreate::new("Widget", 4.5))
            .await
            .unwrap();

        let (order_actor, orders) = order_actor::new(16);
        tokio::spawn(order_actor.run(()));
        let broker = MockBroker::new();
        broker.set_fail_on_publish(true).await;
        let registry = PendingWaiterRegistry::new();
        let service = OrderService::new(
            products,
            orders.clone(),
            Arc::new(broker),
            registry.clone(),
            "orders",
            Duration::from_secs(5),
        );

        let err = service
            .create_order(vec![product.id], &principal())
            .await
            .unwrap_err();

        assert!(matches!(err, OrderServiceError::BrokerUnavailable(_)));
        let stored = orders.list().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, OrderStatus::Failed);
        assert!(registry.is_empty());
    }

    /// Broker whose downstream answers before `publish` even returns.
    struct InstantFulfillment {
        orders: OrderClient,
    }

    #[async_trait::async_trait]
    impl MessageBroker for InstantFulfillment {
        async fn publish(&self, _topic: &str, payload: Vec<u8>) -> crate::broker::Result<()> {
            let request = FulfillmentRequest::decode(&payload)?;
            self.orders
                .set_terminal(request.order_id, OrderStatus::Completed, Utc::now())
                .await
                .map_err(|e| crate::broker::BrokerError::Unavailable(e.to_string()))?;
            Ok(())
        }

        async fn subscribe(&self, topic: &str) -> crate::broker::Result<Subscription> {
            let (_sender, receiver) = tokio::sync::mpsc::channel(1);
            Ok(Subscription::new(topic, receiver))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_before_registration_returns_without_waiting() {
        let (product_actor, products) = product_actor::new(16);
        tokio::spawn(product_actor.run(()));
        let product = products
            .create_product(ProductCreate::new("Widget", 4.5))
            .await
            .unwrap();

        let (order_actor, orders) = order_actor::new(16);
        tokio::spawn(order_actor.run(()));
        let registry = PendingWaiterRegistry::new();
        let service = OrderService::new(
            products,
            orders.clone(),
            Arc::new(InstantFulfillment {
                orders: orders.clone(),
            }),
            registry.clone(),
            "orders",
            Duration::from_secs(5),
        );

        let started = tokio::time::Instant::now();
        let view = service
            .create_order(vec![product.id], &principal())
            .await
            .unwrap();

        assert_eq!(view.status, OrderStatus::Completed);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_order_status_is_not_found() {
        let catalog = MockClient::<Product>::new();
        let broker = MockBroker::new();
        let (service, _orders) = service_with_mocked_catalog(&catalog, &broker);

        let err = service
            .get_order_status(OrderId::from("does-not-exist"), &principal())
            .await
            .unwrap_err();
        assert_eq!(err, OrderServiceError::NotFound("does-not-exist".into()));
    }
}
