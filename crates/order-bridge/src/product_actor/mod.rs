//! # Product Actor
//!
//! The catalog collaborator: a resource actor holding products that orders are priced from.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](resource_actor::ActorEntity) implementation for [`Product`]
//! - [`error`] - [`ProductError`] type for type-safe error handling
//! - [`new()`] - Factory function that creates the actor and client
//!
//! ## Usage
//!
//! ```rust
//! use order_bridge::product_actor;
//! use order_bridge::model::ProductCreate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, client) = product_actor::new(32);
//!     tokio::spawn(actor.run(()));
//!
//!     let product = client
//!         .create_product(ProductCreate::new("Widget", 29.99).with_quantity(100))
//!         .await?;
//!     assert_eq!(product.id.to_string(), "product_1");
//!     Ok(())
//! }
//! ```

pub mod entity;
pub mod error;

pub use entity::ProductAction;
pub use error::*;

use crate::clients::ProductClient;
use crate::model::{Product, ProductId};
use resource_actor::ResourceActor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Creates a new Product actor and its client.
///
/// Ids are sequential (`product_1`, `product_2`, ...) per actor instance.
pub fn new(buffer_size: usize) -> (ResourceActor<Product>, ProductClient) {
    let product_id_counter = Arc::new(AtomicU64::new(1));
    let next_product_id = move || {
        let id = product_id_counter.fetch_add(1, Ordering::SeqCst);
        ProductId(format!("product_{}", id))
    };

    let (actor, generic_client) = ResourceActor::<Product>::new(buffer_size, next_product_id);
    (actor, ProductClient::new(generic_client))
}
