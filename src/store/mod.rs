//! Remote catalog/borrow store.
//!
//! The store is the source of truth for books and borrow records; local state
//! elsewhere in the crate is only a cache of it.
//!
//! # Architecture
//!
//! - [`RemoteStore`] - async trait over the REST resources
//! - [`HttpStore`] - `reqwest` implementation
//! - [`StoreError`] - structured failures (401, rejection, transport, decode)
//!
//! Endpoints:
//!
//! | Method   | Path                 | Auth | Result                     |
//! |----------|----------------------|------|----------------------------|
//! | `GET`    | `/books`             | no   | book list                  |
//! | `GET`    | `/books/{id}`        | opt. | one book                   |
//! | `POST`   | `/books`             | yes  | `insertedId`               |
//! | `PUT`    | `/books/{id}`        | yes  | -                          |
//! | `GET`    | `/borrow/{email}`    | yes  | active borrow records      |
//! | `POST`   | `/borrow`            | yes  | `insertedId`               |
//! | `DELETE` | `/borrow/{recordId}` | yes  | `deletedCount`             |

mod error;
mod http;
#[cfg(test)]
pub(crate) mod testing;
mod wire;

pub use error::{StoreError, TransportSource};
pub use http::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS, HttpStore};

use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::{Book, BookForm, BookId};
use crate::loans::{BorrowDraft, BorrowRecord, RecordId};
use crate::session::Token;

/// Operations the client needs from the catalog/borrow API.
///
/// Implementations never retry; retry policy belongs to callers.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Lists every book in the catalog.
    async fn list_books(&self) -> Result<Vec<Book>, StoreError>;

    /// Fetches one book; the token is attached when present.
    async fn get_book(&self, id: &BookId, token: Option<&Token>) -> Result<Book, StoreError>;

    /// Creates a book and returns its identifier.
    async fn create_book(&self, book: &BookForm, token: &Token) -> Result<BookId, StoreError>;

    /// Replaces the fields of an existing book.
    async fn update_book(&self, id: &BookId, book: &BookForm, token: &Token)
    -> Result<(), StoreError>;

    /// Lists the active borrow records of `email`.
    async fn list_borrows(&self, email: &str, token: &Token) -> Result<Vec<BorrowRecord>, StoreError>;

    /// Creates a borrow record; the store decrements the book's quantity.
    async fn create_borrow(&self, draft: &BorrowDraft, token: &Token) -> Result<RecordId, StoreError>;

    /// Deletes a borrow record, returning how many records were removed.
    async fn delete_borrow(&self, id: &RecordId, token: &Token) -> Result<u64, StoreError>;
}

#[async_trait]
impl<T: RemoteStore + ?Sized> RemoteStore for Arc<T> {
    async fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        (**self).list_books().await
    }

    async fn get_book(&self, id: &BookId, token: Option<&Token>) -> Result<Book, StoreError> {
        (**self).get_book(id, token).await
    }

    async fn create_book(&self, book: &BookForm, token: &Token) -> Result<BookId, StoreError> {
        (**self).create_book(book, token).await
    }

    async fn update_book(
        &self,
        id: &BookId,
        book: &BookForm,
        token: &Token,
    ) -> Result<(), StoreError> {
        (**self).update_book(id, book, token).await
    }

    async fn list_borrows(&self, email: &str, token: &Token) -> Result<Vec<BorrowRecord>, StoreError> {
        (**self).list_borrows(email, token).await
    }

    async fn create_borrow(&self, draft: &BorrowDraft, token: &Token) -> Result<RecordId, StoreError> {
        (**self).create_borrow(draft, token).await
    }

    async fn delete_borrow(&self, id: &RecordId, token: &Token) -> Result<u64, StoreError> {
        (**self).delete_borrow(id, token).await
    }
}
