//! Pluggable error sink.
//!
//! Discovery failures and caller misuse are reported, never raised.  The
//! sink is injected at construction; any `Fn(&str)` closure qualifies.

use tracing::error;

/// Receives human-readable error messages.
pub trait ErrorHandler: Send + Sync {
    fn report(&self, message: &str);
}

impl<F> ErrorHandler for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Default handler: raises the message as an error event on the
/// `globevr::alert` target, where a UI layer can pick it up.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertHandler;

impl ErrorHandler for AlertHandler {
    fn report(&self, message: &str) {
        error!(target: "globevr::alert", "{message}");
    }
}
