//! Order placement: the check-before-commit flow.
//!
//! Submitting an order is the one action where a stale cart costs real
//! money, so `place_order` re-validates the cart immediately before the
//! create call and still handles the remaining race window: the backend
//! answers 409 with the corrections it applied when stock moved between
//! validation and commit.

use std::sync::Arc;

use thiserror::Error;
use tracing::{instrument, warn};

use crate::api::{ApiError, RemoteClient};
use crate::host::{HapticNotification, HostEnvironment};
use crate::store::{CartStore, STOCK_CONFLICT_STATUS};
use crate::types::{AdjustedLine, CartCorrections, NewOrder, Order, RemovedLine};

/// Errors from order placement.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Stock changed under the cart. The cart has already been corrected
    /// (locally for a pre-submit catch, server-side for a 409) and the
    /// lists say exactly what happened.
    #[error("cart changed during checkout: {} removed, {} adjusted", removed.len(), adjusted.len())]
    StockConflict {
        removed: Vec<RemovedLine>,
        adjusted: Vec<AdjustedLine>,
    },

    /// The backend refused the order for a non-stock reason (empty cart,
    /// invalid promo code, delivery address out of range).
    #[error("order rejected: {}", detail.as_deref().unwrap_or("(no detail)"))]
    Rejected { detail: Option<String> },

    /// Transport or decoding failure.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Shape of the 409 conflict body: the usual `detail` plus the correction
/// lists the backend applied while rejecting the order.
#[derive(Debug, serde::Deserialize, Default)]
struct ConflictBody {
    #[serde(default)]
    removed: Vec<RemovedLine>,
    #[serde(default)]
    adjusted: Vec<AdjustedLine>,
}

/// Order submission workflow bound to a cart.
pub struct Checkout {
    api: RemoteClient,
    cart: CartStore,
    host: Arc<dyn HostEnvironment>,
}

impl Checkout {
    /// Create a checkout flow over the given cart.
    #[must_use]
    pub fn new(api: RemoteClient, cart: CartStore, host: Arc<dyn HostEnvironment>) -> Self {
        Self { api, cart, host }
    }

    /// Validate the cart, then submit the order.
    ///
    /// On success the server has already emptied the cart, so the local
    /// cart is cleared to match without another round trip.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::StockConflict`] when validation or the create
    ///   call reports stock changes; the cart reflects the corrections
    ///   before this returns
    /// - [`CheckoutError::Rejected`] for other backend refusals
    /// - [`CheckoutError::Api`] for transport failures
    #[instrument(skip(self, order))]
    pub async fn place_order(&self, order: &NewOrder) -> Result<Order, CheckoutError> {
        let corrections = self.cart.validate().await;
        if !corrections.is_empty() {
            self.host.notify_haptic(HapticNotification::Warning);
            return Err(conflict(corrections));
        }

        match self.api.create_order(order).await {
            Ok(placed) => {
                self.cart.adopt_empty();
                self.host.notify_haptic(HapticNotification::Success);
                Ok(placed)
            }
            Err(ApiError::Server { status, body, .. }) if status == STOCK_CONFLICT_STATUS => {
                // The backend corrected the server cart while rejecting, so
                // the local copy is stale until re-fetched.
                let parsed = serde_json::from_str::<ConflictBody>(&body).unwrap_or_default();
                if let Err(error) = self.cart.fetch().await {
                    warn!(%error, "cart refresh after order conflict failed");
                }
                self.host.notify_haptic(HapticNotification::Warning);
                Err(CheckoutError::StockConflict {
                    removed: parsed.removed,
                    adjusted: parsed.adjusted,
                })
            }
            Err(ApiError::Server { detail, .. }) => {
                self.host.notify_haptic(HapticNotification::Error);
                Err(CheckoutError::Rejected { detail })
            }
            Err(error) => {
                self.host.notify_haptic(HapticNotification::Error);
                Err(error.into())
            }
        }
    }
}

fn conflict(corrections: CartCorrections) -> CheckoutError {
    CheckoutError::StockConflict {
        removed: corrections.removed,
        adjusted: corrections.adjusted,
    }
}
