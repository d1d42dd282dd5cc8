//! Shared shutdown coordination state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cheaply clonable flag for coordinating graceful shutdown.
///
/// The signal handler initiates shutdown; the accept loop checks it before
/// taking new connections.
#[derive(Debug, Clone, Default)]
pub struct ShutdownState {
    initiated: Arc<AtomicBool>,
}

impl ShutdownState {
    /// Creates a shutdown state that has not been initiated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks shutdown as initiated.
    pub fn initiate_shutdown(&self) {
        self.initiated.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown has been initiated.
    pub fn is_shutdown_initiated(&self) -> bool {
        self.initiated.load(Ordering::SeqCst)
    }
}
