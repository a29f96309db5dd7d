use order_bridge::auth::Principal;
use order_bridge::broker::{
    ChannelBroker, CompletionMessage, FulfillmentRequest, MessageBroker, MockBroker,
};
use order_bridge::clients::OrderClient;
use order_bridge::config::ServiceConfig;
use order_bridge::fulfillment::FulfillmentWorker;
use order_bridge::lifecycle::OrderSystem;
use order_bridge::model::{OrderId, OrderStatus, ProductCreate, ProductId};
use order_bridge::service::OrderServiceError;
use resource_actor::ActorClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn principal() -> Principal {
    Principal {
        subject: "test***".into(),
    }
}

async fn start_with_mock(timeout: Duration) -> (OrderSystem, MockBroker) {
    let broker = MockBroker::new();
    let config = ServiceConfig::default().with_order_timeout(timeout);
    let system = OrderSystem::new(config, Arc::new(broker.clone()))
        .await
        .unwrap();
    (system, broker)
}

async fn seed(system: &OrderSystem, name: &str, price: f64) -> ProductId {
    system
        .product_client
        .create_product(ProductCreate::new(name, price))
        .await
        .unwrap()
        .id
}

async fn complete(broker: &MockBroker, order_id: &OrderId, status: &str) {
    let payload = CompletionMessage::new(order_id.clone(), status)
        .encode()
        .unwrap();
    assert_eq!(broker.inject("products", payload).await, 1);
}

/// Polls the store until the consumer has caught up.
async fn wait_for_status(orders: &OrderClient, id: &OrderId, status: OrderStatus) {
    for _ in 0..200 {
        if orders.get_order(id.clone()).await.unwrap().status == status {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("order {id} never reached {status}");
}

#[tokio::test]
async fn test_completed_order_echoes_ids_and_total() {
    let broker = ChannelBroker::default();
    let shared: Arc<dyn MessageBroker> = Arc::new(broker.clone());
    let requests = shared.subscribe("orders").await.unwrap();
    let worker = tokio::spawn(FulfillmentWorker::new(shared.clone(), "products").run(requests));

    let system = OrderSystem::new(ServiceConfig::default(), shared)
        .await
        .unwrap();
    let p1 = seed(&system, "First", 10.0).await;
    let p2 = seed(&system, "Second", 15.0).await;

    let ids = vec![p1.clone(), p2.clone(), p1.clone()];
    let view = system
        .service
        .create_order(ids.clone(), &principal())
        .await
        .unwrap();

    assert_eq!(view.status, OrderStatus::Completed);
    assert_eq!(view.total_price, 35.0);
    assert_eq!(view.products, ids);
    assert!(view.completed_at.is_some());
    assert!(system.registry.is_empty());

    system.shutdown().await.unwrap();
    broker.close();
    assert_eq!(worker.await.unwrap(), 1);
}

#[tokio::test]
async fn test_pending_order_is_completed_by_its_message() {
    let (system, broker) = start_with_mock(Duration::from_secs(5)).await;
    let p1 = seed(&system, "p1", 10.0).await;
    let p2 = seed(&system, "p2", 15.0).await;
    let mut requests = broker.subscribe("orders").await.unwrap();

    let service = system.service.clone();
    let ids = vec![p1, p2];
    let placing = tokio::spawn(async move { service.create_order(ids, &principal()).await });

    let request = FulfillmentRequest::decode(&requests.recv().await.unwrap().payload).unwrap();
    let stored = system
        .order_client
        .get_order(request.order_id.clone())
        .await
        .unwrap();
    assert_eq!(stored.status, OrderStatus::Pending);
    assert_eq!(stored.total_price, 25.0);
    assert_eq!(request.line_items.len(), 2);

    complete(&broker, &request.order_id, "completed").await;
    let view = placing.await.unwrap().unwrap();
    assert_eq!(view.id, request.order_id);
    assert_eq!(view.status, OrderStatus::Completed);
    assert_eq!(view.total_price, 25.0);

    let polled = system
        .service
        .get_order_status(request.order_id, &principal())
        .await
        .unwrap();
    assert_eq!(polled.status, OrderStatus::Completed);
    assert_eq!(polled.total_price, 25.0);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_failure_report_is_returned_to_the_caller() {
    let broker = ChannelBroker::default();
    let shared: Arc<dyn MessageBroker> = Arc::new(broker.clone());
    let requests = shared.subscribe("orders").await.unwrap();
    tokio::spawn(
        FulfillmentWorker::new(shared.clone(), "products")
            .with_outcome(OrderStatus::Failed)
            .run(requests),
    );

    let system = OrderSystem::new(ServiceConfig::default(), shared)
        .await
        .unwrap();
    let p1 = seed(&system, "p1", 3.0).await;

    let view = system
        .service
        .create_order(vec![p1], &principal())
        .await
        .unwrap();
    assert_eq!(view.status, OrderStatus::Failed);

    system.shutdown().await.unwrap();
    broker.close();
}

#[tokio::test(start_paused = true)]
async fn test_timeout_returns_pending_and_late_completion_still_lands() {
    let deadline = Duration::from_millis(500);
    let (system, broker) = start_with_mock(deadline).await;
    let p1 = seed(&system, "p1", 10.0).await;

    let started = Instant::now();
    let view = system
        .service
        .create_order(vec![p1], &principal())
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(view.status, OrderStatus::Pending);
    assert!(view.completed_at.is_none());
    assert!(elapsed >= deadline);
    assert!(elapsed < deadline + Duration::from_millis(50));
    assert!(system.registry.is_empty());

    // nobody is waiting any more, the store still gets the result
    complete(&broker, &view.id, "completed").await;
    wait_for_status(&system.order_client, &view.id, OrderStatus::Completed).await;

    let polled = system
        .service
        .get_order_status(view.id, &principal())
        .await
        .unwrap();
    assert_eq!(polled.status, OrderStatus::Completed);
    assert!(polled.completed_at.is_some());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_duplicate_delivery_never_changes_the_outcome() {
    let (system, broker) = start_with_mock(Duration::from_secs(5)).await;
    let p1 = seed(&system, "p1", 10.0).await;
    let mut requests = broker.subscribe("orders").await.unwrap();

    let service = system.service.clone();
    let placing = tokio::spawn(async move { service.create_order(vec![p1], &principal()).await });
    let request = FulfillmentRequest::decode(&requests.recv().await.unwrap().payload).unwrap();

    complete(&broker, &request.order_id, "completed").await;
    complete(&broker, &request.order_id, "completed").await;
    complete(&broker, &request.order_id, "failed").await;

    let view = placing.await.unwrap().unwrap();
    assert_eq!(view.status, OrderStatus::Completed);

    // let the consumer work through the duplicates
    tokio::time::sleep(Duration::from_millis(50)).await;
    let stored = system
        .order_client
        .get_order(request.order_id)
        .await
        .unwrap();
    assert_eq!(stored.status, OrderStatus::Completed);
    assert_eq!(stored.completed_at, view.completed_at);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_bad_and_unknown_messages_do_not_stop_the_consumer() {
    let (system, broker) = start_with_mock(Duration::from_secs(5)).await;
    let p1 = seed(&system, "p1", 10.0).await;

    broker.inject("products", b"garbage".to_vec()).await;
    broker
        .inject(
            "products",
            br#"{"orderId":"whatever","status":"bogus"}"#.to_vec(),
        )
        .await;
    complete(&broker, &OrderId::from("ghost"), "completed").await;

    let mut requests = broker.subscribe("orders").await.unwrap();
    let service = system.service.clone();
    let placing = tokio::spawn(async move { service.create_order(vec![p1], &principal()).await });
    let request = FulfillmentRequest::decode(&requests.recv().await.unwrap().payload).unwrap();
    complete(&broker, &request.order_id, "completed").await;

    assert_eq!(
        placing.await.unwrap().unwrap().status,
        OrderStatus::Completed
    );

    // no phantom record for the unknown id
    let orders = system.order_client.list().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(
        system
            .service
            .get_order_status(OrderId::from("ghost"), &principal())
            .await,
        Err(OrderServiceError::NotFound("ghost".into()))
    );

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_empty_order_fails_before_any_write() {
    let (system, broker) = start_with_mock(Duration::from_secs(5)).await;

    let err = system
        .service
        .create_order(vec![], &principal())
        .await
        .unwrap_err();

    assert!(matches!(err, OrderServiceError::InvalidProduct(_)));
    assert!(system.order_client.list().await.unwrap().is_empty());
    assert_eq!(broker.published_count().await, 0);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unknown_product_fails_before_any_write() {
    let (system, broker) = start_with_mock(Duration::from_secs(5)).await;
    let p1 = seed(&system, "p1", 10.0).await;

    let err = system
        .service
        .create_order(vec![p1, ProductId::from("product_404")], &principal())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        OrderServiceError::InvalidProduct("product_404".into())
    );
    assert!(system.order_client.list().await.unwrap().is_empty());
    assert_eq!(broker.published_count().await, 0);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unknown_order_status_is_not_found() {
    let (system, _broker) = start_with_mock(Duration::from_secs(5)).await;

    let err = system
        .service
        .get_order_status(OrderId::from("does-not-exist"), &principal())
        .await
        .unwrap_err();
    assert_eq!(err, OrderServiceError::NotFound("does-not-exist".into()));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_publish_failure_leaves_no_pending_order() {
    let (system, broker) = start_with_mock(Duration::from_secs(5)).await;
    let p1 = seed(&system, "p1", 10.0).await;
    broker.set_fail_on_publish(true).await;

    let err = system
        .service
        .create_order(vec![p1], &principal())
        .await
        .unwrap_err();

    assert!(matches!(err, OrderServiceError::BrokerUnavailable(_)));
    let orders = system.order_client.list().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Failed);
    assert!(orders[0].completed_at.is_some());
    assert!(system.registry.is_empty());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_orders_are_independent() {
    let broker = ChannelBroker::default();
    let shared: Arc<dyn MessageBroker> = Arc::new(broker.clone());
    let requests = shared.subscribe("orders").await.unwrap();
    let worker = tokio::spawn(FulfillmentWorker::new(shared.clone(), "products").run(requests));

    let system = OrderSystem::new(ServiceConfig::default(), shared)
        .await
        .unwrap();
    let p1 = seed(&system, "p1", 2.5).await;

    let mut placing = Vec::new();
    for n in 1..=20 {
        let service = system.service.clone();
        let ids = vec![p1.clone(); n];
        placing.push(tokio::spawn(async move {
            service.create_order(ids, &principal()).await
        }));
    }

    for (i, task) in placing.into_iter().enumerate() {
        let view = task.await.unwrap().unwrap();
        assert_eq!(view.status, OrderStatus::Completed);
        assert_eq!(view.products.len(), i + 1);
        assert_eq!(view.total_price, 2.5 * (i + 1) as f64);
    }
    assert!(system.registry.is_empty());
    assert_eq!(system.order_client.list().await.unwrap().len(), 20);

    system.shutdown().await.unwrap();
    broker.close();
    assert_eq!(worker.await.unwrap(), 20);
}

#[tokio::test]
async fn test_system_fails_to_start_on_a_closed_broker() {
    let broker = ChannelBroker::default();
    broker.close();

    let result = OrderSystem::new(ServiceConfig::default(), Arc::new(broker)).await;
    assert!(result.is_err());
}
