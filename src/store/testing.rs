//! In-memory [`RemoteStore`] for unit tests, with failure injection and
//! gates that hold a call open until the test releases it.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};

use super::{RemoteStore, StoreError};
use crate::catalog::{Book, BookForm, BookId};
use crate::loans::{BorrowDraft, BorrowRecord, RecordId};
use crate::session::Token;

/// Failure to inject into the next matching call.
#[derive(Debug, Clone)]
pub(crate) enum Failure {
    Unauthorized,
    Rejected(u16, &'static str),
    Transport,
}

impl Failure {
    fn into_error(self, url: &str) -> StoreError {
        match self {
            Self::Unauthorized => StoreError::unauthorized(url),
            Self::Rejected(status, message) => StoreError::rejected(url, status, message),
            Self::Transport => StoreError::transport(url, "connection reset by peer"),
        }
    }
}

/// Holds calls open until released.
#[derive(Debug)]
pub(crate) struct Gate {
    enabled: AtomicBool,
    started: Notify,
    permits: Semaphore,
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            started: Notify::new(),
            permits: Semaphore::new(0),
        }
    }
}

impl Gate {
    async fn pass(&self) {
        if !self.enabled.load(Ordering::SeqCst) {
            return;
        }
        self.started.notify_one();
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    books: BTreeMap<BookId, Book>,
    borrows: BTreeMap<RecordId, BorrowRecord>,
    created_books: Vec<BookForm>,
    next_id: u64,
    create_borrow_failure: Option<Failure>,
    delete_failure: Option<Failure>,
    delete_count_override: Option<u64>,
    list_borrows_failure: Option<Failure>,
}

#[derive(Debug, Default)]
struct Shared {
    inner: Mutex<Inner>,
    create_borrow_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    create_gate: Gate,
    delete_gate: Gate,
    list_gate: Gate,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeStore {
    shared: Arc<Shared>,
}

impl FakeStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut guard = self
            .shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub(crate) fn put_book(&self, book: Book) {
        self.with_inner(|inner| {
            inner.books.insert(book.id.clone(), book);
        });
    }

    pub(crate) fn book(&self, id: &BookId) -> Option<Book> {
        self.with_inner(|inner| inner.books.get(id).cloned())
    }

    pub(crate) fn put_borrow(&self, record: BorrowRecord) {
        self.with_inner(|inner| {
            inner.borrows.insert(record.record_id.clone(), record);
        });
    }

    pub(crate) fn borrows(&self) -> Vec<BorrowRecord> {
        self.with_inner(|inner| inner.borrows.values().cloned().collect())
    }

    pub(crate) fn created_books(&self) -> Vec<BookForm> {
        self.with_inner(|inner| inner.created_books.clone())
    }

    pub(crate) fn fail_next_create_borrow(&self, failure: Failure) {
        self.with_inner(|inner| inner.create_borrow_failure = Some(failure));
    }

    pub(crate) fn fail_next_delete(&self, failure: Failure) {
        self.with_inner(|inner| inner.delete_failure = Some(failure));
    }

    pub(crate) fn fail_next_list_borrows(&self, failure: Failure) {
        self.with_inner(|inner| inner.list_borrows_failure = Some(failure));
    }

    /// Makes deletes succeed with this count without touching stored records.
    pub(crate) fn report_deleted_count(&self, count: u64) {
        self.with_inner(|inner| inner.delete_count_override = Some(count));
    }

    pub(crate) fn create_borrow_calls(&self) -> usize {
        self.shared.create_borrow_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn delete_calls(&self) -> usize {
        self.shared.delete_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn hold_deletes(&self) {
        self.shared.delete_gate.enabled.store(true, Ordering::SeqCst);
    }

    pub(crate) async fn delete_started(&self) {
        self.shared.delete_gate.started.notified().await;
    }

    pub(crate) fn release_delete(&self) {
        self.shared.delete_gate.permits.add_permits(1);
    }

    pub(crate) fn hold_creates(&self) {
        self.shared.create_gate.enabled.store(true, Ordering::SeqCst);
    }

    pub(crate) async fn create_started(&self) {
        self.shared.create_gate.started.notified().await;
    }

    pub(crate) fn release_create(&self) {
        self.shared.create_gate.permits.add_permits(1);
    }

    /// Holds borrow listings after they are read, before they are returned.
    pub(crate) fn hold_lists(&self) {
        self.shared.list_gate.enabled.store(true, Ordering::SeqCst);
    }

    pub(crate) async fn list_started(&self) {
        self.shared.list_gate.started.notified().await;
    }

    pub(crate) fn release_list(&self) {
        self.shared.list_gate.permits.add_permits(1);
    }

    fn next_id(&self, prefix: &str) -> String {
        self.with_inner(|inner| {
            inner.next_id += 1;
            format!("{prefix}-{:04}", inner.next_id)
        })
    }
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.with_inner(|inner| inner.books.values().cloned().collect()))
    }

    async fn get_book(&self, id: &BookId, _token: Option<&Token>) -> Result<Book, StoreError> {
        self.book(id)
            .ok_or_else(|| StoreError::rejected(format!("fake:/books/{id}"), 404, "Not Found"))
    }

    async fn create_book(&self, book: &BookForm, _token: &Token) -> Result<BookId, StoreError> {
        let id = BookId::new(self.next_id("book"));
        let stored = Book {
            id: id.clone(),
            name: book.name.clone(),
            author: book.author.clone(),
            category: book.category.clone(),
            quantity: book.quantity,
            rating: book.rating,
            image: book.image.clone(),
            description: book.description.clone(),
        };
        self.with_inner(|inner| {
            inner.created_books.push(book.clone());
            inner.books.insert(id.clone(), stored);
        });
        Ok(id)
    }

    async fn update_book(
        &self,
        id: &BookId,
        book: &BookForm,
        _token: &Token,
    ) -> Result<(), StoreError> {
        self.with_inner(|inner| match inner.books.get_mut(id) {
            Some(stored) => {
                stored.name.clone_from(&book.name);
                stored.author.clone_from(&book.author);
                stored.category.clone_from(&book.category);
                stored.quantity = book.quantity;
                stored.rating = book.rating;
                stored.image.clone_from(&book.image);
                stored.description.clone_from(&book.description);
                Ok(())
            }
            None => Err(StoreError::rejected(format!("fake:/books/{id}"), 404, "Not Found")),
        })
    }

    async fn list_borrows(&self, email: &str, _token: &Token) -> Result<Vec<BorrowRecord>, StoreError> {
        if let Some(failure) = self.with_inner(|inner| inner.list_borrows_failure.take()) {
            return Err(failure.into_error(&format!("fake:/borrow/{email}")));
        }
        let records: Vec<BorrowRecord> = self.with_inner(|inner| {
            inner
                .borrows
                .values()
                .filter(|record| record.borrower_email == email)
                .cloned()
                .collect()
        });
        self.shared.list_gate.pass().await;
        Ok(records)
    }

    async fn create_borrow(&self, draft: &BorrowDraft, _token: &Token) -> Result<RecordId, StoreError> {
        self.shared.create_borrow_calls.fetch_add(1, Ordering::SeqCst);
        self.shared.create_gate.pass().await;

        if let Some(failure) = self.with_inner(|inner| inner.create_borrow_failure.take()) {
            return Err(failure.into_error("fake:/borrow"));
        }

        let id = RecordId::new(self.next_id("rec"));
        let record = draft.clone().into_record(id.clone());
        self.with_inner(|inner| {
            if let Some(book) = inner.books.get_mut(&draft.book_id) {
                book.quantity -= 1;
            }
            inner.borrows.insert(id.clone(), record);
        });
        Ok(id)
    }

    async fn delete_borrow(&self, id: &RecordId, _token: &Token) -> Result<u64, StoreError> {
        self.shared.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.shared.delete_gate.pass().await;

        if let Some(failure) = self.with_inner(|inner| inner.delete_failure.take()) {
            return Err(failure.into_error(&format!("fake:/borrow/{id}")));
        }

        Ok(self.with_inner(|inner| {
            if let Some(count) = inner.delete_count_override {
                return count;
            }
            u64::from(inner.borrows.remove(id).is_some())
        }))
    }
}
