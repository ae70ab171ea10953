//! Status and progress reporting for an ingestion run.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

/// Sink for human-readable status messages and numeric progress.
///
/// The error and interrupt flags use interior mutability so that a party
/// holding a shared handle can signal an interrupt while an ingestion is
/// in flight. The interrupt flag is cooperative: it is polled once, right
/// before the cache write.
pub trait StatusSink: Send + Sync {
    fn message(&self, msg: &str);
    fn progress(&self, percent: u8);

    fn set_error(&self);
    fn has_error(&self) -> bool;

    fn set_interrupt(&self);
    fn interrupted(&self) -> bool;
}

/// Default sink that forwards messages and progress to `tracing`.
#[derive(Debug, Default)]
pub struct TracingStatus {
    error: AtomicBool,
    interrupt: AtomicBool,
}

impl TracingStatus {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusSink for TracingStatus {
    fn message(&self, msg: &str) {
        info!("{msg}");
    }

    fn progress(&self, percent: u8) {
        info!(percent, "progress");
    }

    fn set_error(&self) {
        self.error.store(true, Ordering::Relaxed);
    }

    fn has_error(&self) -> bool {
        self.error.load(Ordering::Relaxed)
    }

    fn set_interrupt(&self) {
        self.interrupt.store(true, Ordering::Relaxed);
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }
}
