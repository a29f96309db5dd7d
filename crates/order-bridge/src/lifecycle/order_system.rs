use crate::api::Api;
use crate::auth::StaticTokenVerifier;
use crate::broker::{BrokerError, MessageBroker};
use crate::clients::{OrderClient, ProductClient};
use crate::config::ServiceConfig;
use crate::consumer::CompletionConsumer;
use crate::registry::PendingWaiterRegistry;
use crate::service::OrderService;
use crate::{order_actor, product_actor};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("Could not subscribe to completions: {0}")]
    Subscribe(#[from] BrokerError),

    #[error("Task failed: {0}")]
    TaskFailed(String),
}

/// The running order bridge.
///
/// Owns every actor, the completion consumer and the waiter registry. Nothing is global:
/// two systems in one process (or one per test) never share state.
///
/// ```ignore
/// let system = OrderSystem::new(ServiceConfig::from_env(), Arc::new(ChannelBroker::default())).await?;
/// let view = system.service.create_order(ids, &principal).await?;
/// system.shutdown().await?;
/// ```
pub struct OrderSystem {
    pub config: ServiceConfig,
    pub product_client: ProductClient,
    pub order_client: OrderClient,
    pub registry: PendingWaiterRegistry,
    pub service: OrderService,
    pub api: Api,
    consumer_shutdown: oneshot::Sender<()>,
    consumer_handle: JoinHandle<()>,
    actor_handles: Vec<JoinHandle<()>>,
}

impl OrderSystem {
    /// Starts the actors and the completion consumer.
    ///
    /// Fails if the broker refuses the completion subscription; nothing is left running then.
    pub async fn new(
        config: ServiceConfig,
        broker: Arc<dyn MessageBroker>,
    ) -> Result<Self, SystemError> {
        let subscription = broker.subscribe(&config.completion_topic).await?;

        let (product_actor, product_client) = product_actor::new(config.actor_buffer);
        let (order_actor, order_client) = order_actor::new(config.actor_buffer);
        let actor_handles = vec![
            tokio::spawn(product_actor.run(())),
            tokio::spawn(order_actor.run(())),
        ];

        let registry = PendingWaiterRegistry::new();
        let consumer = CompletionConsumer::new(order_client.clone(), registry.clone());
        let (consumer_shutdown, shutdown) = oneshot::channel();
        let consumer_handle = tokio::spawn(consumer.run(subscription, shutdown));

        let service = OrderService::new(
            product_client.clone(),
            order_client.clone(),
            broker,
            registry.clone(),
            config.request_topic.clone(),
            config.order_timeout,
        );
        let verifier = Arc::new(StaticTokenVerifier::new(config.auth_tokens.clone()));
        let api = Api::new(verifier, product_client.clone(), service.clone());

        info!(
            request_topic = %config.request_topic,
            completion_topic = %config.completion_topic,
            order_timeout = ?config.order_timeout,
            "Order system started"
        );

        Ok(Self {
            config,
            product_client,
            order_client,
            registry,
            service,
            api,
            consumer_shutdown,
            consumer_handle,
            actor_handles,
        })
    }

    /// Stops the consumer, then the actors, and waits for all of them.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down order system");

        // the consumer holds an order client, so it must finish before the actors can
        let _ = self.consumer_shutdown.send(());
        if let Err(e) = self.consumer_handle.await {
            error!(error = ?e, "Completion consumer failed");
            return Err(SystemError::TaskFailed(format!("completion consumer: {e}")));
        }

        drop(self.api);
        drop(self.service);
        drop(self.order_client);
        drop(self.product_client);

        for handle in self.actor_handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Actor task failed");
                return Err(SystemError::TaskFailed(format!("actor: {e}")));
            }
        }

        info!("Order system shutdown complete");
        Ok(())
    }
}
