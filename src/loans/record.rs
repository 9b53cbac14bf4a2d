//! Borrow record model and its wire representation.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{Book, BookId};
use crate::session::Borrower;

/// Store-assigned borrow record identifier.
///
/// Ordering is plain byte order, which the active-record set uses as its
/// stable display order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wraps a raw identifier.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A loan built client-side, before the store has assigned it an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BorrowDraft {
    #[serde(rename = "bookId")]
    pub book_id: BookId,
    pub title: String,
    pub image: String,
    pub category: String,
    #[serde(rename = "email")]
    pub borrower_email: String,
    #[serde(rename = "userName")]
    pub borrower_name: String,
    #[serde(rename = "borrowDate", with = "crate::dates::lenient")]
    pub borrowed_at: NaiveDate,
    #[serde(rename = "returnDate", with = "crate::dates::lenient")]
    pub due_at: NaiveDate,
}

impl BorrowDraft {
    /// Snapshots book metadata and borrower identity into a new loan.
    #[must_use]
    pub fn new(book: &Book, borrower: &Borrower, borrowed_at: NaiveDate, due_at: NaiveDate) -> Self {
        Self {
            book_id: book.id.clone(),
            title: book.name.clone(),
            image: book.image.clone(),
            category: book.category.clone(),
            borrower_email: borrower.email.clone(),
            borrower_name: borrower.display_name.clone(),
            borrowed_at,
            due_at,
        }
    }

    /// Completes the draft with the identifier the store assigned.
    #[must_use]
    pub fn into_record(self, record_id: RecordId) -> BorrowRecord {
        BorrowRecord {
            record_id,
            book_id: self.book_id,
            title: self.title,
            image: self.image,
            category: self.category,
            borrower_email: self.borrower_email,
            borrower_name: self.borrower_name,
            borrowed_at: self.borrowed_at,
            due_at: self.due_at,
        }
    }
}

/// One active loan, as confirmed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowRecord {
    #[serde(rename = "_id")]
    pub record_id: RecordId,
    #[serde(rename = "bookId")]
    pub book_id: BookId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "email")]
    pub borrower_email: String,
    #[serde(rename = "userName", default)]
    pub borrower_name: String,
    #[serde(rename = "borrowDate", with = "crate::dates::lenient")]
    pub borrowed_at: NaiveDate,
    #[serde(rename = "returnDate", with = "crate::dates::lenient")]
    pub due_at: NaiveDate,
}
