// src/detector/debounce.rs

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Default quiet period before a batch of file changes is processed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// A single cancellable, reschedulable deadline.
///
/// Rescheduling replaces the previous deadline in one assignment, so a
/// pending expiry can never fire for an older schedule.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Cancel any pending expiry and start a fresh window from now.
    pub fn reschedule(&mut self) {
        self.deadline = Some(Instant::now() + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Wait for the current deadline and disarm.
    ///
    /// If nothing is scheduled this never resolves, which makes it safe to
    /// use as a `tokio::select!` branch.
    pub async fn expired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
