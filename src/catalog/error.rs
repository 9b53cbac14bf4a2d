//! Error types for catalog operations.

use thiserror::Error;

use crate::session::SessionError;
use crate::store::StoreError;

/// Errors that can occur while reading or editing the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The submitted book failed local validation; nothing was sent.
    #[error("invalid book: {reason}")]
    Invalid {
        /// What was wrong with the input.
        reason: String,
    },

    /// No credential could be obtained for an authenticated call.
    #[error("sign in required: {reason}")]
    Unauthenticated {
        /// Provider-supplied reason.
        reason: String,
    },

    /// The remote store failed or refused the request.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CatalogError {
    /// Creates a validation error.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

impl From<SessionError> for CatalogError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Unauthenticated { reason } => Self::Unauthenticated { reason },
        }
    }
}
