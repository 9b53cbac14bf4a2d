//! Borrow/return lifecycle of the signed-in user.
//!
//! # Architecture
//!
//! - [`LoanCoordinator`] - owns the local loan cache and runs borrow/return
//!   against a [`RemoteStore`](crate::store::RemoteStore)
//! - [`BorrowDraft`] / [`BorrowRecord`] - loan before and after the store
//!   assigned its id
//! - [`LoanError`] - every borrow/return failure
//! - [`derive_countdown`] / [`CountdownTicker`] - time left per loan, and a
//!   scoped task that recomputes it periodically
//!
//! # Example
//!
//! ```no_run
//! use bookshelf_core::loans::LoanCoordinator;
//! use bookshelf_core::session::{Borrower, EnvTokenProvider};
//! use bookshelf_core::store::HttpStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = HttpStore::new("https://library.example/api")?;
//! let loans = LoanCoordinator::new(store, EnvTokenProvider::default());
//! let me = Borrower::new("ann@example.com", "Ann");
//!
//! let books = loans.load_session(&me).await?;
//! let today = chrono::Local::now().date_naive();
//! if let Some(book) = books.iter().find(|b| b.is_available()) {
//!     let record = loans
//!         .borrow(book, Some(&me), today, Some(today + chrono::Days::new(7)))
//!         .await?;
//!     loans.return_book(&record.record_id).await?;
//! }
//! # Ok(())
//! # }
//! ```

mod coordinator;
mod countdown;
mod error;
mod record;
mod state;
mod ticker;
mod transaction;

pub use coordinator::LoanCoordinator;
pub use countdown::{Countdown, derive_countdown, due_instant};
pub use error::LoanError;
pub use record::{BorrowDraft, BorrowRecord, RecordId};
pub use ticker::{CountdownBoard, CountdownTicker, DEFAULT_TICK, DueDateSource, compute_board};
