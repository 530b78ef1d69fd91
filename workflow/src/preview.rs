//! Preview supersession.
//!
//! Every edit restarts the preview pipeline. Instead of ambient debounce
//! timers, each render carries an explicit generation token; a stage whose
//! token is no longer the latest discards its result, so the newest edit
//! always wins and stale renders never reach the learner.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use assembler::{CompositionMode, ProjectSource};
use tokio::time::sleep;
use tracing::debug;

/// Issues and checks preview generation tokens.
#[derive(Debug)]
pub struct PreviewCoordinator {
    latest: AtomicU64,
    debounce: Duration,
}

impl PreviewCoordinator {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            latest: AtomicU64::new(0),
            debounce: Duration::from_millis(debounce_ms),
        }
    }

    /// Start a new preview generation, invalidating all earlier tokens.
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }

    /// Render a preview for one generation.
    ///
    /// Waits out the debounce window, then assembles only if no newer
    /// generation has started; returns `None` for a superseded token.
    pub async fn render_preview(
        &self,
        token: u64,
        source: &ProjectSource,
        mode: CompositionMode,
    ) -> Option<String> {
        sleep(self.debounce).await;
        if !self.is_current(token) {
            debug!(token, "preview superseded during debounce");
            return None;
        }
        let document = assembler::assemble(source, mode);
        if !self.is_current(token) {
            debug!(token, "preview superseded during assembly");
            return None;
        }
        Some(document)
    }
}
