//! Data-synchronization stores.
//!
//! Each store owns its in-memory state exclusively: nothing outside the
//! store mutates the list or the aggregates, which is what keeps optimistic
//! rollback and post-mutation resync correct without any locking protocol
//! beyond a short-lived internal mutex. Locks are never held across await
//! points; the bootstrap sequence issues store operations strictly one at a
//! time. If a caller fires two mutations concurrently, the last response to
//! arrive wins - an accepted race, with no request de-duplication.
//!
//! Refresh policy differs deliberately between stores:
//! - `CartStore` re-fetches after every mutation and after every validation,
//!   because totals are server-computed
//! - `FavoritesStore` updates optimistically and only re-fetches when the
//!   server actually changed something
//! - `ConfigStore` replaces its record wholesale or keeps the old one

pub mod cart;
pub mod config;
pub mod favorites;

pub use cart::CartStore;
pub use config::ConfigStore;
pub use favorites::FavoritesStore;

use thiserror::Error;

use crate::api::ApiError;

/// Errors surfaced by store mutations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The product or variant has no stock left; shown to the user
    /// immediately, distinct from generic failures.
    #[error("{}", detail.as_deref().unwrap_or("item is out of stock"))]
    OutOfStock { detail: Option<String> },

    /// Any other API failure.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Status code the backend uses for stock exhaustion and stock conflicts.
pub(crate) const STOCK_CONFLICT_STATUS: u16 = 409;
