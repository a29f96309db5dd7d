//! Typed clients wrapping the generic `ResourceClient` of each actor.

pub mod order_client;
pub mod product_client;

pub use order_client::OrderClient;
pub use product_client::ProductClient;
