//! Visibility-gated polling.
//!
//! The poller ticks on a fixed interval while the client is visible. While
//! hidden it issues nothing; regaining visibility fires one tick
//! immediately and restarts the interval from there. Dropping the
//! [`VisibilitySender`] ends polling.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};

/// Whether anyone is looking at the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// Shortest interval the poller will run at.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

pub type VisibilitySender = watch::Sender<Visibility>;
pub type VisibilityReceiver = watch::Receiver<Visibility>;

/// Create a visibility channel, initially visible.
pub fn visibility_channel() -> (VisibilitySender, VisibilityReceiver) {
    watch::channel(Visibility::Visible)
}

/// Why a tick fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollReason {
    Interval,
    Resumed,
}

pub struct Poller {
    interval: Duration,
    visibility: VisibilityReceiver,
    next: Instant,
}

impl Poller {
    /// Intervals shorter than [`MIN_INTERVAL`] are raised to it.
    pub fn new(interval: Duration, visibility: VisibilityReceiver) -> Self {
        let interval = if interval < MIN_INTERVAL {
            tracing::warn!(?interval, min = ?MIN_INTERVAL, "poll interval too short, clamping");
            MIN_INTERVAL
        } else {
            interval
        };
        Self {
            interval,
            visibility,
            next: Instant::now() + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for the next refresh. Returns `None` once the visibility sender
    /// is gone.
    pub async fn tick(&mut self) -> Option<PollReason> {
        loop {
            let visible = *self.visibility.borrow_and_update() == Visibility::Visible;

            if !visible {
                tracing::debug!("polling paused while hidden");
                loop {
                    self.visibility.changed().await.ok()?;
                    if *self.visibility.borrow_and_update() == Visibility::Visible {
                        break;
                    }
                }
                tracing::debug!("visibility regained, refreshing");
                self.next = Instant::now() + self.interval;
                return Some(PollReason::Resumed);
            }

            tokio::select! {
                _ = sleep_until(self.next) => {
                    self.next = Instant::now() + self.interval;
                    return Some(PollReason::Interval);
                }
                changed = self.visibility.changed() => {
                    changed.ok()?;
                }
            }
        }
    }
}
