//! Error types for remote store calls.
//!
//! Each variant keeps the request URL so failures can be traced back to the
//! endpoint without extra logging at the call site.

use thiserror::Error;

/// Boxed transport failure, so fakes can produce one without a live socket.
pub type TransportSource = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while talking to the catalog/borrow API.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store answered 401: credential missing, expired, or invalid.
    #[error("unauthorized request to {url} (HTTP 401)")]
    Unauthorized {
        /// The URL that was refused.
        url: String,
    },

    /// Any other non-2xx answer.
    #[error("store rejected {url} (HTTP {status}): {message}")]
    Rejected {
        /// The URL that was refused.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Reason from the body's `error`/`message` field, or the status text.
        message: String,
    },

    /// Connection, DNS or TLS failure; no response was received.
    #[error("network error calling {url}: {source}")]
    Transport {
        /// The URL that failed.
        url: String,
        /// The underlying failure.
        #[source]
        source: TransportSource,
    },

    /// The request did not complete within the configured timeout.
    #[error("timeout calling {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// A 2xx answer whose body could not be decoded.
    #[error("unreadable response from {url} (HTTP {status}): {reason}")]
    Decode {
        /// The URL that answered.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Decoder message.
        reason: String,
    },

    /// The configured base URL cannot address store endpoints.
    #[error("invalid store URL: {url}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
    },
}

impl StoreError {
    /// Creates an unauthorized error.
    pub fn unauthorized(url: impl Into<String>) -> Self {
        Self::Unauthorized { url: url.into() }
    }

    /// Creates a rejection error.
    pub fn rejected(url: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(url: impl Into<String>, source: impl Into<TransportSource>) -> Self {
        Self::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, status: u16, reason: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            status,
            reason: reason.into(),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// True when no response was received at all.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }
}
