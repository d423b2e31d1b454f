//! Write debouncing for rapid-fire persistence triggers.
//!
//! Folds repeated requests into a single delayed write: every request
//! resets the pending timer, and the write fires once after the delay of
//! quiescence. A crash before the delay elapses loses the pending write,
//! which is acceptable for the best-effort stores this guards.

use serde::{Deserialize, Serialize};

/// Reset-on-request quiescence timer, driven by the caller's tick loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debouncer {
    delay_ms: u64,
    pending_since_ms: Option<u64>,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending_since_ms: None,
        }
    }

    /// Register (or re-register) a pending write at `now_ms`.
    pub fn request(&mut self, now_ms: u64) {
        self.pending_since_ms = Some(now_ms);
    }

    pub fn pending(&self) -> bool {
        self.pending_since_ms.is_some()
    }

    /// True exactly once when the quiescence delay has elapsed; the
    /// pending state clears. Call from the tick loop and perform the
    /// write when this returns true.
    pub fn fire(&mut self, now_ms: u64) -> bool {
        match self.pending_since_ms {
            Some(since) if now_ms.saturating_sub(since) >= self.delay_ms => {
                self.pending_since_ms = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending state, returning whether anything was pending.
    /// Used to flush on shutdown without waiting out the delay.
    pub fn take_pending(&mut self) -> bool {
        self.pending_since_ms.take().is_some()
    }
}
