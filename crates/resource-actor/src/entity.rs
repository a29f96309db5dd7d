//! # ActorEntity Trait
//!
//! The contract every resource (Product, Order, ...) implements to be managed by the generic
//! [`ResourceActor`](crate::ResourceActor). It names the associated types for ids, the create
//! payload, custom actions, the injected context and the error type, and provides the
//! `on_create` hook plus the `handle_action` dispatcher.
//!
//! # Architecture Note
//! The actor loop is written *once* against this trait. A `Product` requires a
//! `ProductCreate` payload and an `Order` requires an `OrderCreate`; the compiler rejects a
//! payload sent to the wrong actor.
//!
//! Resources managed here are never updated in place by callers or deleted. Every mutation
//! after creation goes through an explicit [`ActorEntity::Action`], which the actor applies
//! while holding exclusive access to the record. That is what makes a compare-and-set action
//! atomic without locks.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by `ResourceActor`.
///
/// # Async & Context
/// This trait is `#[async_trait]` so hooks can await other actors. The `Context` type is
/// injected into every hook at `run()` time ("late binding"), not at construction time.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this entity. Ids are minted by the id generator handed to
    /// [`ResourceActor::new`](crate::ResourceActor::new), never by callers.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// Enum representing resource-specific operations (e.g. `SetTerminal`).
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The error type for this entity.
    ///
    /// One error enum per actor rather than one per action: clients match on a single type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full entity from the id and payload.
    /// This is called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Called after the entity is built and before it is stored.
    /// An error here aborts the create and nothing is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Handle a custom resource-specific action against the stored record.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
