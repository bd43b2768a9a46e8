//! Minishop storefront client.
//!
//! Client-side engine for a mini-app storefront: REST API client, data
//! stores (cart, favorites, config), the app launch sequence, and the
//! order placement flow. Rendering is out of scope; a UI layer reads
//! store state and calls store methods.
//!
//! # Architecture
//!
//! - [`host::HostEnvironment`] abstracts the embedding container (identity
//!   assertion, alerts, haptics)
//! - [`api::RemoteClient`] is the single point of outbound HTTP
//! - Stores in [`store`] each own one slice of app state; the server is
//!   the source of truth and stores re-fetch rather than recompute
//! - [`bootstrap::AppBootstrap`] wires the stores together and runs the
//!   fixed launch sequence
//! - [`checkout::Checkout`] submits orders with a validate-then-commit
//!   guard against stock races
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use minishop_client::api::RemoteClient;
//! use minishop_client::bootstrap::AppBootstrap;
//! use minishop_client::config::ClientConfig;
//! use minishop_client::host::DetachedHost;
//!
//! let config = ClientConfig::from_env()?;
//! let host = Arc::new(DetachedHost);
//! let api = RemoteClient::new(&config, host.as_ref())?;
//!
//! let app = AppBootstrap::new(api, host);
//! app.run().await;
//!
//! for line in app.cart().lines() {
//!     println!("{} x{}", line.product.name, line.quantity);
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod bootstrap;
pub mod checkout;
pub mod config;
pub mod host;
pub mod store;
pub mod types;

pub use api::{ApiError, RemoteClient};
pub use bootstrap::AppBootstrap;
pub use checkout::{Checkout, CheckoutError};
pub use config::ClientConfig;
pub use host::{DetachedHost, HapticNotification, HostEnvironment};
pub use store::{CartStore, ConfigStore, FavoritesStore, StoreError};
