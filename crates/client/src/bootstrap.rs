//! App startup sequencing.
//!
//! The launch sequence is fixed because the user-facing corrections message
//! is aggregated across steps and must come out in a deterministic order:
//!
//! 1. Host environment integration (best-effort; never blocks startup)
//! 2. Config fetch, fire-and-forget relative to the rest
//! 3. Favorites fetch, then cart fetch
//! 4. Favorites validation
//! 5. Cart validation
//! 6. One combined alert if any validation changed anything

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{instrument, warn};

use crate::api::RemoteClient;
use crate::host::HostEnvironment;
use crate::store::{CartStore, ConfigStore, FavoritesStore};
use crate::types::{CartCorrections, RemovedFavorite};

/// Composition root: owns the stores and runs the launch sequence.
pub struct AppBootstrap {
    host: Arc<dyn HostEnvironment>,
    config: ConfigStore,
    favorites: FavoritesStore,
    cart: CartStore,
}

impl AppBootstrap {
    /// Wire up the stores around a shared API client and host.
    #[must_use]
    pub fn new(api: RemoteClient, host: Arc<dyn HostEnvironment>) -> Self {
        Self {
            config: ConfigStore::new(api.clone()),
            favorites: FavoritesStore::new(api.clone(), Arc::clone(&host)),
            cart: CartStore::new(api, Arc::clone(&host)),
            host,
        }
    }

    /// The shop config store.
    #[must_use]
    pub const fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// The favorites store.
    #[must_use]
    pub const fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    /// The cart store.
    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// The host environment handle.
    #[must_use]
    pub fn host(&self) -> Arc<dyn HostEnvironment> {
        Arc::clone(&self.host)
    }

    /// Run the launch sequence. Individual step failures degrade (empty
    /// lists, missing config) instead of aborting; the sequence itself
    /// always runs to completion.
    #[instrument(skip(self))]
    pub async fn run(&self) {
        // Host integration first; unsupported hooks on old containers must
        // not block startup.
        self.host.ready();
        self.host.expand();
        if !self.host.enable_closing_confirmation() {
            warn!("closing confirmation not supported by host");
        }

        // Config is needed by views, not by the validation flow below, so
        // nothing waits on it.
        let config = self.config.clone();
        tokio::spawn(async move {
            config.fetch().await;
        });

        if let Err(error) = self.favorites.fetch().await {
            warn!(%error, "favorites fetch failed at startup");
        }
        if let Err(error) = self.cart.fetch().await {
            warn!(%error, "cart fetch failed at startup");
        }

        let favorites_removed = self.favorites.validate().await;
        let corrections = self.cart.validate().await;

        if let Some(message) = compose_corrections_message(&favorites_removed, &corrections) {
            self.host.show_alert(&message);
        }
    }
}

/// Merge validation results into one human-readable message, ordered
/// favorites-removed, cart-removed, cart-adjusted. Returns `None` when
/// there is nothing to tell the user.
#[must_use]
pub fn compose_corrections_message(
    favorites_removed: &[RemovedFavorite],
    corrections: &CartCorrections,
) -> Option<String> {
    let mut sections = Vec::new();

    if !favorites_removed.is_empty() {
        let names = favorites_removed
            .iter()
            .map(|removed| removed.product_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        sections.push(format!("Removed from favorites (out of stock): {names}"));
    }

    if !corrections.removed.is_empty() {
        let names = corrections
            .removed
            .iter()
            .map(|removed| removed.product_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        sections.push(format!("Removed from cart (out of stock): {names}"));
    }

    if !corrections.adjusted.is_empty() {
        let mut section = String::from("Cart quantities changed: ");
        for (i, adjusted) in corrections.adjusted.iter().enumerate() {
            if i > 0 {
                section.push_str(", ");
            }
            let _ = write!(
                section,
                "{}: {} \u{2192} {}",
                adjusted.product_name, adjusted.old_quantity, adjusted.new_quantity
            );
        }
        sections.push(section);
    }

    if sections.is_empty() {
        None
    } else {
        Some(sections.join("\n"))
    }
}
