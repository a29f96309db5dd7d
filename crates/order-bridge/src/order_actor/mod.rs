//! # Order Actor
//!
//! The order store: a resource actor whose sequential loop makes the terminal
//! compare-and-set atomic per record without any lock.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](resource_actor::ActorEntity) implementation for [`Order`]
//! - [`actions`] - [`OrderAction::SetTerminal`] and its result
//! - [`error`] - [`OrderError`] type
//! - [`new()`] - Factory function that creates the actor and client
//!
//! Orders are never deleted; the runtime offers no delete request.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::OrderClient;
use crate::model::{Order, OrderId};
use resource_actor::ResourceActor;

/// Creates a new Order actor and its client. Ids are random v4 UUIDs.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, OrderClient) {
    let (actor, generic_client) = ResourceActor::<Order>::new(buffer_size, OrderId::generate);
    (actor, OrderClient::new(generic_client))
}
