//! # Order Bridge demo
//!
//! Starts the system on the in-process broker with a simulated fulfillment worker, then
//! creates a product and places an order through the API layer.
//!
//! ```bash
//! RUST_LOG=info cargo run -p order-bridge
//! RUST_LOG=debug ORDER_TIMEOUT_MS=200 cargo run -p order-bridge
//! ```

use order_bridge::api::CreateOrderRequest;
use order_bridge::broker::{ChannelBroker, MessageBroker};
use order_bridge::config::ServiceConfig;
use order_bridge::fulfillment::FulfillmentWorker;
use order_bridge::lifecycle::OrderSystem;
use order_bridge::model::ProductCreate;
use resource_actor::tracing::setup_tracing;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = ServiceConfig::from_env();
    info!(port = config.port, broker_uri = %config.broker_uri, "Starting order bridge");

    let channel_broker = ChannelBroker::new(config.channel_capacity, config.publish_timeout);
    let broker: Arc<dyn MessageBroker> = Arc::new(channel_broker.clone());

    let requests = broker.subscribe(&config.request_topic).await?;
    let worker = FulfillmentWorker::new(broker.clone(), config.completion_topic.clone())
        .with_delay(Duration::from_millis(100));
    let worker_handle = tokio::spawn(worker.run(requests));

    let system = OrderSystem::new(config, broker).await?;
    let credential = Some("Bearer demo-token");

    let product = async {
        info!("Creating demo product");
        system
            .api
            .create_product(
                credential,
                ProductCreate::new("Test Product", 100.0)
                    .with_description("A product for testing")
                    .with_quantity(5),
            )
            .await
    }
    .instrument(tracing::info_span!("product_creation"))
    .await?;
    info!(product_id = %product.body.id, status = product.status, "Product created");

    let order = async {
        info!("Placing demo order");
        system
            .api
            .create_order(
                credential,
                CreateOrderRequest {
                    ids: vec![product.body.id.clone(), product.body.id.clone()],
                },
            )
            .await
    }
    .instrument(tracing::info_span!("order_processing"))
    .await;

    match order {
        Ok(reply) => {
            info!(
                order_id = %reply.body.id,
                status = %reply.body.status,
                total_price = reply.body.total_price,
                "Order answered"
            );
            println!("{}", serde_json::to_string_pretty(&reply.body)?);
        }
        Err(e) => error!(status = e.status_code(), error = %e, "Order failed"),
    }

    system.shutdown().await?;
    channel_broker.close();
    let answered = worker_handle.await?;
    info!(answered, "Demo complete");
    Ok(())
}
