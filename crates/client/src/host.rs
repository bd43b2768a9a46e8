//! Host environment integration.
//!
//! The app runs inside a messaging-app mini-app container that supplies an
//! identity assertion (an opaque signed blob the backend verifies in place
//! of a login flow), native alert dialogs, and haptic feedback. Everything
//! here is best-effort: older container versions lack some hooks, and the
//! SDK must keep working when run outside the container entirely.

use secrecy::SecretString;

/// Haptic notification kinds supported by the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticNotification {
    Success,
    Warning,
    Error,
}

/// The embedding runtime's surface as consumed by this SDK.
///
/// Implementations must be cheap to call; none of these methods may block.
/// Lifecycle hooks default to no-ops so partial hosts only implement what
/// they have.
pub trait HostEnvironment: Send + Sync {
    /// The signed identity blob to assert on every backend request, if the
    /// container provided one.
    fn identity_assertion(&self) -> Option<SecretString>;

    /// Show a native alert dialog with the given message.
    fn show_alert(&self, message: &str);

    /// Fire a haptic notification.
    fn notify_haptic(&self, _kind: HapticNotification) {}

    /// Tell the container the app has finished loading.
    fn ready(&self) {}

    /// Ask the container to expand the web view to full height.
    fn expand(&self) {}

    /// Ask the container to confirm before closing the app.
    ///
    /// Returns whether the container supports the hook. Callers must not
    /// treat `false` as an error; old container versions lack it.
    fn enable_closing_confirmation(&self) -> bool {
        false
    }
}

/// Host used when running outside the mini-app container (local development,
/// tests of non-identity paths). Provides no identity assertion, which the
/// backend answers with 401 and the UI surfaces as a config-load failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedHost;

impl HostEnvironment for DetachedHost {
    fn identity_assertion(&self) -> Option<SecretString> {
        None
    }

    fn show_alert(&self, message: &str) {
        tracing::info!(message, "alert (detached host)");
    }
}
