//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the process-wide subscriber. Every actor, client and service in
//! this workspace logs through `tracing` with structured fields (`entity_type`, `order_id`,
//! `topic`, `status`), so one filter controls everything:
//!
//! ```bash
//! RUST_LOG=info cargo run      # lifecycle and state transitions
//! RUST_LOG=debug cargo run     # full payloads
//! RUST_LOG=order_bridge::consumer=debug,info cargo run
//! ```
//!
//! The compact format hides module paths (`with_target(false)`) and shows span hierarchy
//! inline, e.g. `create_order{order_id=...}: Order created`.

/// Initializes the global `tracing` subscriber, filtered by `RUST_LOG`.
///
/// Calling it twice panics, so binaries call it once at startup and tests leave it alone.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
