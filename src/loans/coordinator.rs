//! Borrow/return lifecycle for the signed-in user.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use futures_util::future::try_join;
use tracing::{debug, info, instrument, warn};

use crate::catalog::{Book, BookId};
use crate::session::{Borrower, TokenProvider};
use crate::store::RemoteStore;

use super::countdown::Countdown;
use super::error::LoanError;
use super::record::{BorrowDraft, BorrowRecord, RecordId};
use super::state::{LoanState, lock};
use super::ticker::{DueDateSource, compute_board};
use super::transaction::RemovalTxn;

/// Keeps the local view of the user's loans consistent with the remote store.
///
/// Borrowing is conservative: nothing changes locally until the store has
/// created the record. Returning is optimistic: the record disappears at once
/// and comes back if the store does not confirm the delete.
///
/// All local state sits behind one mutex that is never held across an
/// `.await`, so each synchronous section is atomic with respect to other
/// operations on the same coordinator.
#[derive(Debug)]
pub struct LoanCoordinator<S, P> {
    store: S,
    tokens: P,
    state: Mutex<LoanState>,
}

impl<S: RemoteStore, P: TokenProvider> LoanCoordinator<S, P> {
    /// Creates a coordinator with an empty session.
    #[must_use]
    pub fn new(store: S, tokens: P) -> Self {
        Self {
            store,
            tokens,
            state: Mutex::new(LoanState::default()),
        }
    }

    /// Active records, ordered by record id.
    #[must_use]
    pub fn active_records(&self) -> Vec<BorrowRecord> {
        lock(&self.state).active.values().cloned().collect()
    }

    /// One active record.
    #[must_use]
    pub fn record(&self, record_id: &RecordId) -> Option<BorrowRecord> {
        lock(&self.state).active.get(record_id).cloned()
    }

    /// True when the user currently holds `book_id`.
    #[must_use]
    pub fn has_borrowed(&self, book_id: &BookId) -> bool {
        lock(&self.state).holds_book(book_id)
    }

    /// Last known available quantity of `book_id`, if cached.
    #[must_use]
    pub fn known_quantity(&self, book_id: &BookId) -> Option<i64> {
        lock(&self.state).quantities.get(book_id).copied()
    }

    /// True while a return of `record_id` is waiting on the store.
    #[must_use]
    pub fn is_returning(&self, record_id: &RecordId) -> bool {
        lock(&self.state).returns_in_flight.contains_key(record_id)
    }

    /// Caches the quantity of a freshly fetched book.
    pub fn remember_book(&self, book: &Book) {
        lock(&self.state)
            .quantities
            .insert(book.id.clone(), book.quantity);
    }

    /// Drops every cached record and starts a new session epoch.
    ///
    /// Responses to calls issued before the reset no longer touch local
    /// state when they arrive.
    pub fn reset_session(&self) {
        let mut state = lock(&self.state);
        state.reset();
        debug!(epoch = state.epoch, "loan session reset");
    }

    /// Replaces local state with the user's borrow records and the catalog,
    /// fetched concurrently. Returns the catalog.
    ///
    /// # Errors
    ///
    /// [`LoanError::InvalidInput`] for an incomplete borrower,
    /// [`LoanError::Unauthenticated`] without a session, and the mapped store
    /// error when either listing fails. Local state is left empty on failure.
    #[instrument(level = "debug", skip(self, borrower), fields(email = %borrower.email))]
    pub async fn load_session(&self, borrower: &Borrower) -> Result<Vec<Book>, LoanError> {
        if !borrower.is_complete() {
            return Err(LoanError::invalid_input("borrower email and name are required"));
        }
        let epoch = {
            let mut state = lock(&self.state);
            state.reset();
            state.epoch
        };

        let token = self.tokens.get_token().await?;
        let (records, books) = try_join(
            self.store.list_borrows(&borrower.email, &token),
            self.store.list_books(),
        )
        .await?;

        let mut state = lock(&self.state);
        if state.epoch != epoch {
            debug!(epoch, current = state.epoch, "discarding stale session load");
            return Ok(books);
        }
        state.active = records
            .into_iter()
            .map(|record| (record.record_id.clone(), record))
            .collect();
        state.quantities = books
            .iter()
            .map(|book| (book.id.clone(), book.quantity))
            .collect();
        info!(
            records = state.active.len(),
            books = books.len(),
            "loan session loaded"
        );
        Ok(books)
    }

    /// Re-reads the user's borrow records without touching the quantity
    /// cache. Records whose return is still pending stay hidden.
    ///
    /// A listing that raced a confirmed borrow or return may predate it, so
    /// it is dropped and the local view kept.
    ///
    /// # Errors
    ///
    /// Same as [`load_session`](Self::load_session).
    #[instrument(level = "debug", skip(self, borrower), fields(email = %borrower.email))]
    pub async fn refresh_borrows(&self, borrower: &Borrower) -> Result<(), LoanError> {
        if !borrower.is_complete() {
            return Err(LoanError::invalid_input("borrower email and name are required"));
        }
        let (epoch, revision) = {
            let state = lock(&self.state);
            (state.epoch, state.revision)
        };
        let token = self.tokens.get_token().await?;
        let records = self.store.list_borrows(&borrower.email, &token).await?;

        let mut state = lock(&self.state);
        if state.epoch != epoch {
            debug!(epoch, current = state.epoch, "discarding stale borrow refresh");
            return Ok(());
        }
        if state.revision != revision {
            debug!(
                revision,
                current = state.revision,
                "loans changed during refresh; keeping local records"
            );
            return Ok(());
        }
        let hidden = &state.returns_in_flight;
        let active: BTreeMap<RecordId, BorrowRecord> = records
            .into_iter()
            .filter(|record| !hidden.contains_key(&record.record_id))
            .map(|record| (record.record_id.clone(), record))
            .collect();
        state.active = active;
        debug!(records = state.active.len(), "borrow records refreshed");
        Ok(())
    }

    /// Borrows `book` for `borrower` until `due_at`.
    ///
    /// Local state is updated only once the store has created the record:
    /// the record is added and the cached quantity drops by one.
    ///
    /// # Errors
    ///
    /// Pre-checks, in order, before any remote call:
    /// [`LoanError::Unauthenticated`] without a borrower,
    /// [`LoanError::InvalidInput`] for an incomplete borrower or a missing or
    /// early due date, [`LoanError::AlreadyBorrowed`],
    /// [`LoanError::OutOfStock`], and [`LoanError::InFlight`] when the same
    /// book is already being borrowed or its return is still unconfirmed. Credential and store failures map to
    /// [`LoanError::Unauthenticated`], [`LoanError::RemoteRejected`] or
    /// [`LoanError::TransportError`]; none of them changes local state.
    #[instrument(level = "debug", skip(self, book, borrower), fields(book_id = %book.id))]
    pub async fn borrow(
        &self,
        book: &Book,
        borrower: Option<&Borrower>,
        borrowed_at: NaiveDate,
        due_at: Option<NaiveDate>,
    ) -> Result<BorrowRecord, LoanError> {
        let borrower = borrower.ok_or_else(|| LoanError::unauthenticated("no signed-in user"))?;
        if !borrower.is_complete() {
            return Err(LoanError::invalid_input("borrower email and name are required"));
        }
        let due_at = due_at.ok_or_else(|| LoanError::invalid_input("return date is required"))?;
        if due_at < borrowed_at {
            return Err(LoanError::invalid_input(format!(
                "return date {due_at} is before borrow date {borrowed_at}"
            )));
        }

        let pending = PendingBorrow::begin(&self.state, book)?;

        let token = self.tokens.get_token().await?;
        let draft = BorrowDraft::new(book, borrower, borrowed_at, due_at);
        let record_id = match self.store.create_borrow(&draft, &token).await {
            Ok(id) => id,
            Err(error) => {
                warn!(book_id = %book.id, error = %error, "borrow failed");
                return Err(error.into());
            }
        };

        let record = draft.into_record(record_id);
        if pending.commit(&record, book.quantity) {
            info!(
                record_id = %record.record_id,
                book_id = %record.book_id,
                title = %record.title,
                due = %record.due_at,
                "book borrowed"
            );
        }
        Ok(record)
    }

    /// Returns the book behind `record_id`.
    ///
    /// The record leaves local state before the delete is sent and is put
    /// back, unchanged, if the delete fails or is dropped unfinished. The
    /// cached quantity is not incremented; availability is the store's to
    /// restore.
    ///
    /// # Errors
    ///
    /// [`LoanError::NotFound`] for an unknown record,
    /// [`LoanError::InFlight`] when its return is already pending,
    /// [`LoanError::InconsistentDelete`] when the store deleted nothing, and
    /// the mapped credential or store error otherwise.
    #[instrument(level = "debug", skip(self, record_id), fields(record_id = %record_id))]
    pub async fn return_book(&self, record_id: &RecordId) -> Result<(), LoanError> {
        let txn = RemovalTxn::apply(&self.state, record_id)?;
        let title = txn.snapshot().title.clone();

        let token = match self.tokens.get_token().await {
            Ok(token) => token,
            Err(error) => {
                txn.rollback();
                return Err(error.into());
            }
        };

        match self.store.delete_borrow(record_id, &token).await {
            Ok(0) => {
                warn!(record_id = %record_id, "store deleted nothing; restoring record");
                txn.rollback();
                Err(LoanError::InconsistentDelete {
                    record_id: record_id.clone(),
                })
            }
            Ok(count) => {
                if count > 1 {
                    warn!(record_id = %record_id, count, "store deleted more than one record");
                }
                txn.confirm();
                info!(record_id = %record_id, title = %title, "book returned");
                Ok(())
            }
            Err(error) => {
                warn!(record_id = %record_id, error = %error, "return failed; restoring record");
                txn.rollback();
                Err(error.into())
            }
        }
    }

    /// Countdown of every active record at `now`.
    #[must_use]
    pub fn countdowns(&self, now: DateTime<Utc>) -> BTreeMap<RecordId, Countdown> {
        compute_board(self, now)
    }
}

impl<S: RemoteStore, P: TokenProvider> DueDateSource for LoanCoordinator<S, P> {
    fn due_dates(&self) -> Vec<(RecordId, NaiveDate)> {
        lock(&self.state)
            .active
            .values()
            .map(|record| (record.record_id.clone(), record.due_at))
            .collect()
    }
}

/// In-flight marker for one borrow; cleared on drop.
struct PendingBorrow<'a> {
    state: &'a Mutex<LoanState>,
    book_id: BookId,
    epoch: u64,
}

impl<'a> PendingBorrow<'a> {
    fn begin(state: &'a Mutex<LoanState>, book: &Book) -> Result<Self, LoanError> {
        let mut guard = lock(state);
        if guard.holds_book(&book.id) {
            return Err(LoanError::AlreadyBorrowed {
                book_id: book.id.clone(),
            });
        }
        // A failed return puts the record back, so the book stays held.
        if guard.returning_book(&book.id) {
            return Err(LoanError::in_flight(&book.id));
        }
        let quantity = guard
            .quantities
            .get(&book.id)
            .copied()
            .unwrap_or(book.quantity);
        if quantity <= 0 {
            return Err(LoanError::OutOfStock {
                book_id: book.id.clone(),
            });
        }
        if !guard.borrows_in_flight.insert(book.id.clone()) {
            return Err(LoanError::in_flight(&book.id));
        }
        Ok(Self {
            state,
            book_id: book.id.clone(),
            epoch: guard.epoch,
        })
    }

    /// Inserts `record` and decrements the cached quantity, unless the
    /// session changed meanwhile. Returns whether local state was updated.
    fn commit(self, record: &BorrowRecord, fallback_quantity: i64) -> bool {
        let mut guard = lock(self.state);
        if guard.epoch != self.epoch {
            debug!(record_id = %record.record_id, "session changed while borrowing; not caching record");
            return false;
        }
        let previous = guard
            .quantities
            .get(&record.book_id)
            .copied()
            .unwrap_or(fallback_quantity);
        guard.quantities.insert(record.book_id.clone(), previous - 1);
        guard.active.insert(record.record_id.clone(), record.clone());
        guard.bump_revision();
        true
    }
}

impl Drop for PendingBorrow<'_> {
    fn drop(&mut self) {
        let mut guard = lock(self.state);
        if guard.epoch == self.epoch {
            guard.borrows_in_flight.remove(&self.book_id);
        }
    }
}
