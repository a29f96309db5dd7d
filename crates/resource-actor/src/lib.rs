//! # Resource Actor
//!
//! Foundational building blocks for type-safe, concurrent resource stores on Tokio. Each
//! resource type gets its own actor task that owns a keyed store and processes requests one
//! at a time; callers talk to it through a cheap, cloneable client.
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ActorEntity`]) - the domain model and its actions
//! 2. **Runtime Layer** ([`ResourceActor`]) - message processing and id generation
//! 3. **Interface Layer** ([`ResourceClient`], [`ActorClient`]) - typed request/response
//!
//! ## Why an actor per store?
//!
//! Sequential processing inside the actor makes every request atomic with respect to every
//! other request on the same store. A compare-and-set expressed as an [`ActorEntity::Action`]
//! needs no lock, and no caller ever holds one while it waits.
//!
//! ```text
//!  ResourceClient ──mpsc──▶ ResourceActor { HashMap<Id, T> }
//!        ▲                          │
//!        └────────── oneshot ◀──────┘
//! ```
//!
//! ## Context Injection
//!
//! Dependencies are injected at `run(context)` time rather than at construction, so actors
//! that need each other's clients can be created first and wired afterwards.
//!
//! ## Testing
//!
//! [`mock::MockClient`] implements the same client API over scripted replies, for testing
//! logic that sits around a client without spawning the real actor.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod tracing;

pub use actor::{IdGenerator, ResourceActor};
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
