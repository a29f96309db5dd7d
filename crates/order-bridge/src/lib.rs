//! # Order Bridge
//!
//! A catalog-and-ordering service whose order creation is a correlated request/reply over
//! a message broker: the order is stored `pending`, a fulfillment request is published,
//! and the caller is suspended until the matching completion arrives or a deadline passes.
//! Completions that arrive after the caller was answered still reach the store.
//!
//! ## Modules
//!
//! - [`model`]: products, orders and the caller-facing [`OrderView`](model::OrderView)
//! - [`product_actor`], [`order_actor`]: resource actors holding the catalog and the orders
//! - [`clients`]: typed clients for both actors
//! - [`broker`]: the [`MessageBroker`](broker::MessageBroker) seam, wire messages, in-process and mock brokers
//! - [`registry`]: the [`PendingWaiterRegistry`](registry::PendingWaiterRegistry)
//! - [`consumer`]: the [`CompletionConsumer`](consumer::CompletionConsumer)
//! - [`service`]: the [`OrderService`](service::OrderService) orchestrator
//! - [`auth`], [`api`]: token verification and the transport-agnostic HTTP surface
//! - [`config`], [`lifecycle`]: settings and system wiring
//! - [`fulfillment`]: a simulated downstream worker for demos and tests

pub mod api;
pub mod auth;
pub mod broker;
pub mod clients;
pub mod config;
pub mod consumer;
pub mod fulfillment;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod product_actor;
pub mod registry;
pub mod service;
