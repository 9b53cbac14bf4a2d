//! Scoped periodic countdown recomputation.
//!
//! A [`CountdownTicker`] owns a spawned task that, on every tick, reads the
//! current due dates from its source and publishes a fresh
//! [`CountdownBoard`]. The task is aborted when the ticker is stopped or
//! dropped, however the owning view goes away.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::trace;

use super::countdown::{Countdown, derive_countdown, due_instant};
use super::record::RecordId;

/// Default recomputation period.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Countdown per active record, ordered by record id.
pub type CountdownBoard = BTreeMap<RecordId, Countdown>;

/// Anything that can list the due dates of the loans being watched.
pub trait DueDateSource: Send + Sync {
    /// Current `(record id, due date)` pairs.
    fn due_dates(&self) -> Vec<(RecordId, NaiveDate)>;
}

/// Derives every countdown of `source` at `now`.
#[must_use]
pub fn compute_board<S: DueDateSource + ?Sized>(source: &S, now: DateTime<Utc>) -> CountdownBoard {
    source
        .due_dates()
        .into_iter()
        .map(|(record_id, due)| (record_id, derive_countdown(now, due_instant(due))))
        .collect()
}

/// Handle to a running countdown task.
#[derive(Debug)]
pub struct CountdownTicker {
    task: JoinHandle<()>,
    board: watch::Receiver<CountdownBoard>,
}

impl CountdownTicker {
    /// Spawns the periodic task on the current tokio runtime.
    ///
    /// The first board is published immediately, then once per `period`.
    /// Ticks missed while the runtime was busy are skipped, not replayed.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero or when called outside a tokio runtime.
    #[must_use]
    pub fn start<S: DueDateSource + ?Sized + 'static>(source: Arc<S>, period: Duration) -> Self {
        let (sender, board) = watch::channel(CountdownBoard::new());
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let next = compute_board(source.as_ref(), Utc::now());
                trace!(records = next.len(), "countdowns recomputed");
                if sender.send(next).is_err() {
                    break;
                }
            }
        });
        Self { task, board }
    }

    /// A receiver that observes every published board.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CountdownBoard> {
        self.board.clone()
    }

    /// The most recently published board.
    #[must_use]
    pub fn latest(&self) -> CountdownBoard {
        self.board.borrow().clone()
    }

    /// Waits for the next published board.
    ///
    /// Returns `None` once the task has ended.
    pub async fn next(&mut self) -> Option<CountdownBoard> {
        self.board.changed().await.ok()?;
        Some(self.board.borrow_and_update().clone())
    }

    /// True while the periodic task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the task. Equivalent to dropping the ticker.
    pub fn stop(self) {}
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
