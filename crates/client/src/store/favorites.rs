//! Favorites store: a set of favorited products with optimistic toggling.
//!
//! Favoriting is a low-stakes, latency-sensitive interaction, so `toggle`
//! applies the local change before the network call and rolls back to the
//! exact pre-toggle list if the call fails. A successful toggle is followed
//! by a canonical re-fetch; if only that re-fetch fails, the optimistic
//! state stays (the mutation itself is known to have succeeded).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{instrument, warn};

use minishop_core::ProductId;

use crate::api::RemoteClient;
use crate::host::HostEnvironment;
use crate::types::{Product, RemovedFavorite};

use super::StoreError;

#[derive(Debug, Default)]
struct FavoritesState {
    items: Vec<Product>,
    loading: bool,
}

/// The favorites list's single owner.
#[derive(Clone)]
pub struct FavoritesStore {
    inner: Arc<FavoritesStoreInner>,
}

struct FavoritesStoreInner {
    api: RemoteClient,
    host: Arc<dyn HostEnvironment>,
    state: Mutex<FavoritesState>,
}

impl FavoritesStore {
    /// Create an empty favorites store.
    #[must_use]
    pub fn new(api: RemoteClient, host: Arc<dyn HostEnvironment>) -> Self {
        Self {
            inner: Arc::new(FavoritesStoreInner {
                api,
                host,
                state: Mutex::new(FavoritesState::default()),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, FavoritesState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Current favorited products.
    #[must_use]
    pub fn items(&self) -> Vec<Product> {
        self.state().items.clone()
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// Pure local membership check.
    #[must_use]
    pub fn is_favorite(&self, product_id: ProductId) -> bool {
        self.state().items.iter().any(|item| item.id == product_id)
    }

    /// Replace local state with the server's canonical favorites list.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails; local state is kept as-is.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<(), StoreError> {
        self.state().loading = true;
        let result = self.inner.api.get_favorites().await;
        match result {
            Ok(items) => {
                let mut state = self.state();
                state.items = items;
                state.loading = false;
                Ok(())
            }
            Err(error) => {
                self.state().loading = false;
                Err(error.into())
            }
        }
    }

    /// Toggle a product's favorite status: snapshot, speculative-apply,
    /// commit-or-revert.
    ///
    /// `snapshot` is the product display data to insert optimistically when
    /// favoriting; ignored when unfavoriting.
    ///
    /// # Errors
    ///
    /// Returns the API error from the add/remove call after restoring the
    /// pre-toggle list exactly. A failed canonical re-fetch afterwards is
    /// not an error.
    #[instrument(skip(self, snapshot), fields(product_id = %product_id))]
    pub async fn toggle(
        &self,
        product_id: ProductId,
        currently_favorite: bool,
        snapshot: Option<Product>,
    ) -> Result<(), StoreError> {
        let previous = {
            let mut state = self.state();
            let previous = state.items.clone();
            if currently_favorite {
                state.items.retain(|item| item.id != product_id);
            } else if let Some(mut product) = snapshot {
                product.is_favorite = true;
                state.items.push(product);
            }
            previous
        };

        let result = if currently_favorite {
            self.inner.api.remove_favorite(product_id).await
        } else {
            self.inner.api.add_favorite(product_id).await
        };

        if let Err(error) = result {
            // Rollback: restore the pre-toggle snapshot verbatim
            self.state().items = previous;
            if let Some(detail) = error.detail() {
                self.inner.host.show_alert(detail);
            }
            return Err(error.into());
        }

        match self.inner.api.get_favorites().await {
            Ok(items) => self.state().items = items,
            Err(error) => {
                // Toggle succeeded; only the refresh failed. Keep the
                // optimistic state.
                warn!(%error, "favorites refresh after toggle failed");
            }
        }

        Ok(())
    }

    /// Drop favorited products that are no longer purchasable. Re-fetches
    /// the canonical list only when something was actually removed.
    ///
    /// Degrades to "nothing removed" on failure rather than blocking
    /// startup.
    #[instrument(skip(self))]
    pub async fn validate(&self) -> Vec<RemovedFavorite> {
        match self.inner.api.validate_favorites().await {
            Ok(validation) => {
                if !validation.removed.is_empty()
                    && let Err(error) = self.fetch().await
                {
                    warn!(%error, "favorites refresh after validation failed");
                }
                validation.removed
            }
            Err(error) => {
                warn!(%error, "favorites validation failed; assuming no removals");
                Vec::new()
            }
        }
    }
}
