//! Shop configuration store.
//!
//! Single-record cache: `fetch` replaces the whole record or leaves the
//! previous one untouched on failure - never a partial merge. The `loading`
//! flag is the startup gate: the rest of the app renders only after the
//! first fetch completes or fails.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{instrument, warn};

use crate::api::RemoteClient;
use crate::types::ShopConfig;

#[derive(Debug)]
struct ConfigState {
    config: Option<ShopConfig>,
    loading: bool,
}

/// Process-wide, read-mostly shop settings snapshot.
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<ConfigStoreInner>,
}

struct ConfigStoreInner {
    api: RemoteClient,
    state: Mutex<ConfigState>,
}

impl ConfigStore {
    /// Create a store with no config yet; `is_loading` starts true so the
    /// startup gate holds until the first fetch resolves.
    #[must_use]
    pub fn new(api: RemoteClient) -> Self {
        Self {
            inner: Arc::new(ConfigStoreInner {
                api,
                state: Mutex::new(ConfigState {
                    config: None,
                    loading: true,
                }),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ConfigState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The current config snapshot, if any fetch has succeeded yet.
    #[must_use]
    pub fn get(&self) -> Option<ShopConfig> {
        self.state().config.clone()
    }

    /// Whether the first fetch is still outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// Fetch the config, replacing the snapshot wholesale on success. On
    /// failure the previous snapshot (if any) is kept and the gate opens
    /// anyway; without a valid identity assertion the backend answers 401
    /// and the app simply has no config.
    #[instrument(skip(self))]
    pub async fn fetch(&self) {
        let result = self.inner.api.get_config().await;
        let mut state = self.state();
        match result {
            Ok(config) => state.config = Some(config),
            Err(error) => warn!(%error, "config fetch failed"),
        }
        state.loading = false;
    }
}
