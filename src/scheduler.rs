// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Single-shot deferred validation ticks.

use tokio::time::Instant;

/// A pending validation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTick {
    /// When the cycle should run.
    pub due: Instant,
    /// Countdown value the cycle validates with.
    pub countdown: u32,
}

/// Holds at most one pending tick.
///
/// Scheduling replaces any pending tick, and a cancelled tick is gone for good,
/// so two cycles can never be outstanding at once.
#[derive(Debug, Clone, Default)]
pub struct TickScheduler {
    pending: Option<ScheduledTick>,
}

impl TickScheduler {
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Schedule the next cycle, replacing any pending one.
    pub fn schedule(&mut self, due: Instant, countdown: u32) {
        self.pending = Some(ScheduledTick { due, countdown });
    }

    /// Drop the pending tick, returning it if there was one.
    pub fn cancel(&mut self) -> Option<ScheduledTick> {
        self.pending.take()
    }

    /// Remove and return the pending tick if it is due at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<ScheduledTick> {
        match self.pending {
            Some(tick) if tick.due <= now => self.pending.take(),
            _ => None,
        }
    }

    /// When the pending tick is due.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|tick| tick.due)
    }

    #[must_use]
    pub const fn pending(&self) -> Option<&ScheduledTick> {
        self.pending.as_ref()
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
