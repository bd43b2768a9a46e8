//! Cart store: line items, server-computed aggregates, and the
//! stock-validation workflow.
//!
//! Aggregates (`total_price`, `total_items`) are authoritative only right
//! after a successful fetch or validation; local edits never recompute them.
//! Every mutation therefore ends with a full re-fetch, so the UI reflects
//! server-enforced clamping and pricing rules the client does not know.
//! The one exception is `clear()`, which resets locally without a re-fetch
//! since the result is always empty.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{instrument, warn};

use minishop_core::{CartLineId, Price, ProductId, VariantSelector};

use crate::api::{ApiError, RemoteClient};
use crate::host::HostEnvironment;
use crate::types::{CartCorrections, CartLine, CartLineInput, CartSnapshot};

use super::{STOCK_CONFLICT_STATUS, StoreError};

const ADD_FAILED: &str = "Could not add the item to your cart";
const UPDATE_FAILED: &str = "Could not update your cart";
const REMOVE_FAILED: &str = "Could not remove the item from your cart";
const CLEAR_FAILED: &str = "Could not clear your cart";

#[derive(Debug, Default)]
struct CartState {
    lines: Vec<CartLine>,
    total_price: Price,
    total_items: u32,
    loading: bool,
}

/// The cart's single owner. All mutation goes through these methods.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    api: RemoteClient,
    host: Arc<dyn HostEnvironment>,
    state: Mutex<CartState>,
}

impl CartStore {
    /// Create an empty cart store.
    #[must_use]
    pub fn new(api: RemoteClient, host: Arc<dyn HostEnvironment>) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                api,
                host,
                state: Mutex::new(CartState::default()),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, CartState> {
        // The lock is never held across an await, so a poisoned mutex can
        // only mean a panic mid-read; the state itself is still consistent.
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Read access
    // =========================================================================

    /// Current cart lines, in server order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.state().lines.clone()
    }

    /// Server-computed cart total.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.state().total_price
    }

    /// Server-computed item count (sum of quantities).
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.state().total_items
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// Pure local lookup by (product, normalized variant selector).
    ///
    /// `None` and empty-string selector parts are the same "no variant"
    /// identity, so at most one line can match.
    #[must_use]
    pub fn find_line(&self, product_id: ProductId, selector: &VariantSelector) -> Option<CartLine> {
        self.state()
            .lines
            .iter()
            .find(|line| line.product_id == product_id && line.selector() == *selector)
            .cloned()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Replace local state with the server's current cart snapshot.
    ///
    /// Idempotent; safe to call on every relevant screen mount.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails; local state is kept as-is.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<(), StoreError> {
        self.state().loading = true;
        let result = self.inner.api.get_cart().await;
        match result {
            Ok(snapshot) => {
                self.apply_snapshot(snapshot);
                Ok(())
            }
            Err(error) => {
                self.state().loading = false;
                Err(error.into())
            }
        }
    }

    /// Request the server add (or increment) a line, then resync.
    ///
    /// # Errors
    ///
    /// `StoreError::OutOfStock` when the server reports zero available
    /// stock for the product/variant; `StoreError::Api` otherwise. Both are
    /// alerted through the host before returning.
    #[instrument(skip(self, selector), fields(product_id = %product_id))]
    pub async fn add_line(
        &self,
        product_id: ProductId,
        quantity: u32,
        selector: VariantSelector,
    ) -> Result<(), StoreError> {
        let input = CartLineInput::new(product_id, quantity, &selector);
        match self.inner.api.add_to_cart(&input).await {
            Ok(_) => {
                self.resync().await;
                Ok(())
            }
            Err(ApiError::Server { status, detail, .. }) if status == STOCK_CONFLICT_STATUS => {
                self.alert_failure(detail.as_deref(), "item is out of stock");
                Err(StoreError::OutOfStock { detail })
            }
            Err(error) => {
                self.alert_failure(error.detail(), ADD_FAILED);
                Err(error.into())
            }
        }
    }

    /// Update a line's quantity; a quantity of zero is a removal, not an
    /// error. Re-fetches on success and on failure alike, so the UI picks
    /// up server-side clamping instead of a stale optimistic value.
    ///
    /// # Errors
    ///
    /// Returns the underlying API error after alerting and resyncing.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn update_line(&self, line_id: CartLineId, quantity: u32) -> Result<(), StoreError> {
        let result = if quantity == 0 {
            self.inner.api.remove_cart_line(line_id).await.map(|_| ())
        } else {
            self.inner
                .api
                .update_cart_line(line_id, quantity)
                .await
                .map(|_| ())
        };

        match result {
            Ok(()) => {
                self.resync().await;
                Ok(())
            }
            Err(error) => {
                self.alert_failure(error.detail(), UPDATE_FAILED);
                self.resync().await;
                Err(error.into())
            }
        }
    }

    /// Delete a line, then resync.
    ///
    /// # Errors
    ///
    /// Returns the underlying API error after alerting.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn remove_line(&self, line_id: CartLineId) -> Result<(), StoreError> {
        match self.inner.api.remove_cart_line(line_id).await {
            Ok(_) => {
                self.resync().await;
                Ok(())
            }
            Err(error) => {
                self.alert_failure(error.detail(), REMOVE_FAILED);
                Err(error.into())
            }
        }
    }

    /// Delete every line server-side, then reset locally without a
    /// re-fetch: the result is always empty, so there is nothing to
    /// reconcile.
    ///
    /// # Errors
    ///
    /// Returns the underlying API error after alerting; local state is
    /// untouched on failure.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), StoreError> {
        match self.inner.api.clear_cart().await {
            Ok(_) => {
                self.adopt_empty();
                Ok(())
            }
            Err(error) => {
                self.alert_failure(error.detail(), CLEAR_FAILED);
                Err(error.into())
            }
        }
    }

    /// Re-check every line against current server stock and adopt the
    /// corrected snapshot as new truth, even when nothing changed.
    ///
    /// Called at app launch, on cart-page entry, and immediately before
    /// order submission - the check-before-commit guard against a stock
    /// race between browse time and purchase time. Degrades to "no
    /// corrections" on failure rather than blocking navigation.
    #[instrument(skip(self))]
    pub async fn validate(&self) -> CartCorrections {
        match self.inner.api.validate_cart().await {
            Ok(validation) => {
                self.apply_snapshot(CartSnapshot {
                    items: validation.items,
                    total_price: validation.total_price,
                    total_items: validation.total_items,
                });
                CartCorrections {
                    removed: validation.removed,
                    adjusted: validation.adjusted,
                }
            }
            Err(error) => {
                warn!(%error, "cart validation failed; assuming no corrections");
                CartCorrections::default()
            }
        }
    }

    /// Adopt an empty cart locally without a server call. Used after order
    /// placement, where the backend has already emptied the cart.
    pub(crate) fn adopt_empty(&self) {
        let mut state = self.state();
        state.lines.clear();
        state.total_price = Price::ZERO;
        state.total_items = 0;
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn apply_snapshot(&self, snapshot: CartSnapshot) {
        let mut state = self.state();
        state.lines = snapshot.items;
        state.total_price = snapshot.total_price;
        state.total_items = snapshot.total_items;
        state.loading = false;
    }

    /// Re-fetch after a mutation. A failed resync keeps the previous local
    /// state; the mutation itself already happened server-side.
    async fn resync(&self) {
        if let Err(error) = self.fetch().await {
            warn!(%error, "cart resync after mutation failed");
        }
    }

    fn alert_failure(&self, detail: Option<&str>, fallback: &str) {
        self.inner.host.show_alert(detail.unwrap_or(fallback));
    }
}
