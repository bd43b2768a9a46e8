//! Core types for Minishop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod variant;

pub use id::*;
pub use price::Price;
pub use variant::VariantSelector;
