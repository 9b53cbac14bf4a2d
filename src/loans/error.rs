//! Error taxonomy for borrow and return operations.

use thiserror::Error;

use crate::catalog::BookId;
use crate::session::SessionError;
use crate::store::StoreError;

use super::record::RecordId;

/// Errors surfaced by [`LoanCoordinator`](super::LoanCoordinator).
///
/// Every variant is returned to the caller; the coordinator never retries.
/// On failure a borrow leaves local state untouched and a return restores
/// the record it removed.
#[derive(Debug, Error)]
pub enum LoanError {
    /// No signed-in identity, or the store answered 401.
    #[error("sign in required: {reason}")]
    Unauthenticated {
        /// Provider or store supplied reason.
        reason: String,
    },

    /// Missing or malformed dates or identity fields.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong.
        reason: String,
    },

    /// The current user already holds this book.
    #[error("book {book_id} is already borrowed by this user")]
    AlreadyBorrowed {
        /// Book the user already holds.
        book_id: BookId,
    },

    /// The last known quantity for this book is zero or less.
    #[error("book {book_id} is out of stock")]
    OutOfStock {
        /// Book without available copies.
        book_id: BookId,
    },

    /// The record is not in the active set.
    #[error("no active borrow record {record_id}")]
    NotFound {
        /// Identifier that was looked up.
        record_id: RecordId,
    },

    /// The same borrow or return is already waiting on the store.
    #[error("an operation on {target} is already in progress")]
    InFlight {
        /// Book or record identifier the pending operation targets.
        target: String,
    },

    /// Non-2xx answer from the store.
    #[error("store rejected the request (HTTP {status}): {message}")]
    RemoteRejected {
        /// HTTP status code.
        status: u16,
        /// Reason from the response body when available.
        message: String,
    },

    /// No response was received (network failure or timeout).
    #[error("could not reach the store: {reason}")]
    TransportError {
        /// Underlying failure description.
        reason: String,
    },

    /// 2xx delete answer that reported zero records removed.
    #[error("store reported no record deleted for {record_id}")]
    InconsistentDelete {
        /// Identifier the delete targeted.
        record_id: RecordId,
    },
}

impl LoanError {
    /// Creates an invalid-input error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates an unauthenticated error.
    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        Self::Unauthenticated {
            reason: reason.into(),
        }
    }

    /// Creates an in-flight error for a book or record identifier.
    pub fn in_flight(target: impl ToString) -> Self {
        Self::InFlight {
            target: target.to_string(),
        }
    }
}

impl From<SessionError> for LoanError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Unauthenticated { reason } => Self::Unauthenticated { reason },
        }
    }
}

impl From<StoreError> for LoanError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Unauthorized { url } => {
                Self::unauthenticated(format!("store refused credential for {url}"))
            }
            StoreError::Rejected { status, message, .. } => Self::RemoteRejected { status, message },
            StoreError::Transport { .. } | StoreError::Timeout { .. } => Self::TransportError {
                reason: error.to_string(),
            },
            // A 2xx body we cannot read still means the store answered.
            StoreError::Decode { status, .. } => Self::RemoteRejected {
                status,
                message: error.to_string(),
            },
            StoreError::InvalidUrl { .. } => Self::invalid_input(error.to_string()),
        }
    }
}
