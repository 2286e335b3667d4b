//! Cooperative cancellation for long-running searches and planners.
//!
//! Algorithms call [`Interrupt::check`] at their loop boundaries (frontier
//! pops, DP state expansions, greedy rounds) and bail out with
//! [`Error::Cancelled`] or [`Error::Timeout`] instead of returning a partial
//! result.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::Error;

#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    deadline: Option<Instant>,
    cancelled: Option<Arc<AtomicBool>>,
}

impl Interrupt {
    /// An interrupt that never fires
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancelled: None,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Attach a shared flag; setting it to `true` from any thread cancels the run.
    #[must_use]
    pub fn cancelled_by(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = Some(flag);
        self
    }

    pub fn check(&self) -> Result<(), Error> {
        if let Some(flag) = &self.cancelled {
            if flag.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Error::Timeout);
            }
        }
        Ok(())
    }
}
