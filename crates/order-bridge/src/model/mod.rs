//! Pure data structures (DTOs) implementing the [`ActorEntity`](resource_actor::ActorEntity) trait.

pub mod order;
pub mod product;

pub use order::*;
pub use product::*;
