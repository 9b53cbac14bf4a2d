//! Local cache of the current user's loans and book availability.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::catalog::BookId;

use super::record::{BorrowRecord, RecordId};

/// Everything the coordinator caches for one session.
///
/// Guarded by a plain mutex that is only held in synchronous sections, never
/// across an `.await`.
#[derive(Debug, Default)]
pub(crate) struct LoanState {
    /// Bumped whenever the session is reloaded or reset; responses tagged
    /// with an older epoch are discarded.
    pub(crate) epoch: u64,
    /// Active records keyed (and therefore ordered) by record id.
    pub(crate) active: BTreeMap<RecordId, BorrowRecord>,
    /// Last known available quantity per book.
    pub(crate) quantities: HashMap<BookId, i64>,
    /// Pending returns and the book each one releases.
    pub(crate) returns_in_flight: HashMap<RecordId, BookId>,
    pub(crate) borrows_in_flight: HashSet<BookId>,
    /// Bumped whenever a borrow or return is confirmed by the store.
    pub(crate) revision: u64,
}

impl LoanState {
    /// True when the user has an active record for `book_id`.
    pub(crate) fn holds_book(&self, book_id: &BookId) -> bool {
        self.active.values().any(|record| &record.book_id == book_id)
    }

    /// True while a return of some record for `book_id` is unconfirmed.
    pub(crate) fn returning_book(&self, book_id: &BookId) -> bool {
        self.returns_in_flight.values().any(|pending| pending == book_id)
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision += 1;
    }

    /// Starts a new epoch with empty caches.
    pub(crate) fn reset(&mut self) {
        let epoch = self.epoch + 1;
        *self = Self {
            epoch,
            ..Self::default()
        };
    }
}

/// Locks the state, recovering from poisoning.
///
/// Every critical section leaves the state consistent before it can panic,
/// so a poisoned lock still guards valid data.
pub(crate) fn lock(state: &Mutex<LoanState>) -> MutexGuard<'_, LoanState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
