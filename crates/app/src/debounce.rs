//! Cancellable quiet-period timer.
//!
//! [`Debouncer::schedule`] arms a timer and cancels whatever was armed
//! before it, so only the most recently scheduled callback can fire. Each
//! schedule gets a generation number; owners that receive the firing
//! through a channel use [`Debouncer::settle`] to reject firings that were
//! already queued when a newer schedule replaced them.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub struct Debouncer {
    delay: Duration,
    pending: Option<CancellationToken>,
    generation: u64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            generation: 0,
        }
    }

    /// Whether a scheduled callback has neither fired nor been settled.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Run `on_fire` once the quiet period elapses without another call.
    ///
    /// The deadline is fixed at call time. Must be called from within a
    /// Tokio runtime. Returns the generation passed to `on_fire`.
    pub fn schedule<F>(&mut self, on_fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let deadline = Instant::now() + self.delay;
        let token = CancellationToken::new();
        self.pending = Some(token.clone());

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => on_fire(generation),
            }
        });

        generation
    }

    /// Drop the pending callback, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }

    /// Accept a firing. Returns `false` for a generation that was
    /// superseded or already settled.
    pub fn settle(&mut self, generation: u64) -> bool {
        if self.pending.is_some() && generation == self.generation {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
