//! # System Lifecycle
//!
//! Wiring and teardown of the whole bridge.
//!
//! ## Startup
//!
//! 1. Create the product and order actors (no dependencies, so no construction cycles)
//! 2. Spawn each actor's run loop with its context
//! 3. Subscribe the completion consumer *before* any order can be placed, so no
//!    completion is published into a topic nobody listens on
//! 4. Build the service and API on top of the clients
//!
//! ## Shutdown
//!
//! 1. Signal the consumer; it stops accepting messages and drains what is queued
//! 2. Drop every client so each actor's channel closes
//! 3. Await every task, reporting any that panicked
//!
//! Tracing is installed separately with [`resource_actor::tracing::setup_tracing`].

pub mod order_system;

pub use order_system::*;
