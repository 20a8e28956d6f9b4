use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// One-way cancellation flag shared between the signal listener and the hold loop.
///
/// Only ever moves from "running" to "cancelled".
#[derive(Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true for the call that performed the transition.
    pub fn cancel(&self) -> bool {
        self.cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Cancel `token` on SIGINT, SIGTERM or SIGHUP.
///
/// The listener never touches the connection; cleanup stays with the caller.
pub fn install(token: &CancelToken) -> Result<()> {
    let token = token.clone();
    ctrlc::set_handler(move || {
        if token.cancel() {
            info!("termination signal received, releasing lock");
        }
    })?;
    Ok(())
}
