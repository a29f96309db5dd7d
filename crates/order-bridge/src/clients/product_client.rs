//! # Product Client
//!
//! High-level API for the `Product` actor. This is the catalog collaborator orders are
//! priced against.
use crate::model::{LineItem, Product, ProductCreate, ProductId};
use crate::product_actor::ProductError;
use async_trait::async_trait;
use resource_actor::{ActorClient, FrameworkError, ResourceClient};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    /// Like [`ActorClient::get`] but an unknown id is an error.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ProductError> {
        self.get(id.clone())
            .await?
            .ok_or_else(|| ProductError::NotFound(id.to_string()))
    }

    /// Prices every id as it stands right now, one line item per occurrence.
    ///
    /// Each distinct id is fetched once. The first unknown id fails the whole call with
    /// [`ProductError::InvalidProduct`].
    #[instrument(skip(self))]
    pub async fn resolve_products(&self, ids: &[ProductId]) -> Result<Vec<LineItem>, ProductError> {
        let mut prices: HashMap<&ProductId, f64> = HashMap::new();
        let mut line_items = Vec::with_capacity(ids.len());

        for id in ids {
            let price = match prices.get(id) {
                Some(price) => *price,
                None => {
                    let product = self
                        .get(id.clone())
                        .await?
                        .ok_or_else(|| ProductError::InvalidProduct(id.to_string()))?;
                    prices.insert(id, product.price);
                    product.price
                }
            };
            line_items.push(LineItem {
                product_id: id.clone(),
                price,
            });
        }

        debug!(count = line_items.len(), "Resolved products");
        Ok(line_items)
    }
}

#[async_trait]
impl ActorClient<Product> for ProductClient {
    type Error = ProductError;

    fn inner(&self) -> &ResourceClient<Product> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => ProductError::NotFound(id),
            other => other
                .into_entity_error::<ProductError>()
                .unwrap_or_else(|e| ProductError::ActorCommunicationError(e.to_string())),
        }
    }
}
