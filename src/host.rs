// src/host.rs

//! "The host is shutting down" flag.
//!
//! Exit notifications are not forwarded to tasks once the flag is set, so
//! task callbacks never run during teardown. Registry bookkeeping is not
//! affected.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::Lazy;
use tracing::info;

static GLOBAL: Lazy<HostState> = Lazy::new(HostState::new);

/// Shared shutdown flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct HostState {
    exiting: Arc<AtomicBool>,
}

impl HostState {
    /// A fresh flag, independent of the process-wide one.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide flag used by default.
    pub fn global() -> HostState {
        GLOBAL.clone()
    }

    /// Mark the host as terminating. Idempotent.
    pub fn begin_shutdown(&self) {
        if !self.exiting.swap(true, Ordering::SeqCst) {
            info!("host shutdown started; exit notifications are now suppressed");
        }
    }

    pub fn is_exiting(&self) -> bool {
        self.exiting.load(Ordering::SeqCst)
    }
}
