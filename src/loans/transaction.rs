//! Reversible local removal used by the optimistic return flow.
//!
//! [`RemovalTxn::apply`] takes a record out of the active set and keeps its
//! pre-image. The caller then either [`confirm`](RemovalTxn::confirm)s once
//! the store has deleted it, or [`rollback`](RemovalTxn::rollback)s on any
//! failure. A transaction dropped while unresolved rolls back, since the
//! delete was never confirmed.

use std::sync::Mutex;

use tracing::debug;

use super::error::LoanError;
use super::record::{BorrowRecord, RecordId};
use super::state::{LoanState, lock};

/// A record removed from local state, pending remote confirmation.
#[derive(Debug)]
pub(crate) struct RemovalTxn<'a> {
    state: &'a Mutex<LoanState>,
    snapshot: BorrowRecord,
    epoch: u64,
    resolved: bool,
}

impl<'a> RemovalTxn<'a> {
    /// Removes `record_id` from the active set and marks it in flight.
    ///
    /// # Errors
    ///
    /// [`LoanError::InFlight`] when a removal of the same record is already
    /// pending, [`LoanError::NotFound`] when the record is not active.
    pub(crate) fn apply(state: &'a Mutex<LoanState>, record_id: &RecordId) -> Result<Self, LoanError> {
        let mut guard = lock(state);
        if guard.returns_in_flight.contains_key(record_id) {
            return Err(LoanError::in_flight(record_id));
        }
        let Some(snapshot) = guard.active.remove(record_id) else {
            return Err(LoanError::NotFound {
                record_id: record_id.clone(),
            });
        };
        guard
            .returns_in_flight
            .insert(record_id.clone(), snapshot.book_id.clone());
        let epoch = guard.epoch;
        drop(guard);

        Ok(Self {
            state,
            snapshot,
            epoch,
            resolved: false,
        })
    }

    /// The pre-image captured when the record was removed.
    pub(crate) fn snapshot(&self) -> &BorrowRecord {
        &self.snapshot
    }

    /// Makes the removal permanent.
    pub(crate) fn confirm(mut self) {
        self.finish(false);
    }

    /// Puts the pre-image back into the active set.
    pub(crate) fn rollback(mut self) {
        self.finish(true);
    }

    fn finish(&mut self, restore: bool) {
        self.resolved = true;
        let mut guard = lock(self.state);
        if guard.epoch != self.epoch {
            debug!(
                record_id = %self.snapshot.record_id,
                "session changed while return was pending; leaving new session untouched"
            );
            return;
        }
        guard.returns_in_flight.remove(&self.snapshot.record_id);
        if restore {
            guard
                .active
                .insert(self.snapshot.record_id.clone(), self.snapshot.clone());
        } else {
            guard.bump_revision();
        }
    }
}

impl Drop for RemovalTxn<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            self.finish(true);
        }
    }
}
