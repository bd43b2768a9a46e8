//! Minishop Core - Shared types library.
//!
//! This crate provides common types used across all Minishop components:
//! - `client` - Mini-app storefront SDK (REST client, stores, bootstrap)
//! - `integration-tests` - Mock backend and end-to-end store tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and variant
//!   selectors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
