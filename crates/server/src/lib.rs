//! Halcyon platform backend library.
//!
//! This crate provides the backend as a library, allowing it to be tested
//! and reused. The binary in `main.rs` wires configuration, the store, and
//! the HTTP surface together.
//!
//! # Architecture
//!
//! - [`store`] - dual-mode persistence facade: a PostgreSQL JSONB document
//!   store when the database is reachable at startup, otherwise a
//!   process-local in-memory store. The mode is fixed once per process and
//!   business logic never branches on it.
//! - [`services`] - the marketplace request/item workflow engine, the
//!   analytics aggregator, the content service, and password hashing.
//! - [`notify`] - the fire-and-forget notification port the workflow and
//!   content paths publish into; the real-time channel lives elsewhere.
//! - [`routes`] - thin JSON handlers; no domain logic.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
