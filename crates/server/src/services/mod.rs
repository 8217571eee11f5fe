//! Domain services.
//!
//! - [`marketplace`] - the request/item workflow engine
//! - [`analytics`] - time-bucketed reporting over the facade
//! - [`content`] - keyed CMS writes with change notifications
//! - [`auth`] - password hashing helpers (full authentication is external)

pub mod analytics;
pub mod auth;
pub mod content;
pub mod marketplace;
