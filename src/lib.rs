//! Bookshelf Core Library
//!
//! Client side of a library catalog: browse and edit books, borrow and
//! return them, and track how long each loan has left.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`catalog`] - book model, search filters, add/update forms
//! - [`loans`] - borrow/return coordinator, countdowns, and the countdown ticker
//! - [`session`] - signed-in identity and bearer token providers
//! - [`store`] - remote REST store trait and its HTTP implementation
//! - [`dates`] - lenient date parsing shared by the wire format and the CLI

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod dates;
pub mod loans;
pub mod session;
pub mod store;
mod user_agent;

// Re-export commonly used types
pub use catalog::{Book, BookFilter, BookForm, BookId, Catalog, CatalogError, Category};
pub use loans::{
    BorrowRecord, Countdown, CountdownTicker, LoanCoordinator, LoanError, RecordId,
    derive_countdown,
};
pub use session::{Borrower, EnvTokenProvider, StaticTokenProvider, Token, TokenProvider};
pub use store::{HttpStore, RemoteStore, StoreError};
