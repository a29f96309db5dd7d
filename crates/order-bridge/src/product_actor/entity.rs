//! Entity trait implementation for the Product domain type.
//!
//! Products are immutable once created: the catalog is a point-in-time price source for
//! orders, so there are no product actions.

use super::error::ProductError;
use crate::model::{Product, ProductCreate, ProductId};
use async_trait::async_trait;
use resource_actor::ActorEntity;

/// Product has no resource-specific operations.
#[derive(Debug, Clone)]
pub enum ProductAction {}

#[async_trait]
impl ActorEntity for Product {
    type Id = ProductId;
    type Create = ProductCreate;
    type Action = ProductAction;
    type ActionResult = ();
    type Context = ();
    type Error = ProductError;

    /// Builds a Product after checking the catalog rules.
    ///
    /// # Rules
    /// - `name` must be non-empty after trimming
    /// - `price` must be a finite, non-negative number
    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, Self::Error> {
        let name = params.name.trim();
        if name.is_empty() {
            return Err(ProductError::Validation("name must not be empty".into()));
        }
        if !params.price.is_finite() || params.price < 0.0 {
            return Err(ProductError::Validation(format!(
                "price must be a non-negative number, got {}",
                params.price
            )));
        }

        Ok(Self {
            id,
            name: name.to_string(),
            description: params.description,
            price: params.price,
            quantity: params.quantity,
        })
    }

    async fn handle_action(
        &mut self,
        action: ProductAction,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        match action {}
    }
}
