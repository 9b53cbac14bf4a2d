//! Session identity and bearer credentials.
//!
//! The identity provider is opaque to this crate: all the rest of the client
//! needs is "a bearer token for the current session" and the identity of the
//! signed-in patron. Both are passed in explicitly rather than read from
//! process-wide state.
//!
//! # Example
//!
//! ```
//! use bookshelf_core::session::{StaticTokenProvider, TokenProvider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = StaticTokenProvider::new("eyJhbGciOi...");
//! let token = provider.get_token().await?;
//! assert_eq!(token.expose(), "eyJhbGciOi...");
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Environment variable read by [`EnvTokenProvider::default`].
pub const DEFAULT_TOKEN_ENV: &str = "BOOKSHELF_TOKEN";

/// Errors raised while obtaining a credential.
#[derive(Debug, Error)]
pub enum SessionError {
    /// There is no signed-in session to issue a token for.
    #[error("no active session: {reason}")]
    Unauthenticated {
        /// Why no token could be issued.
        reason: String,
    },
}

impl SessionError {
    /// Creates an unauthenticated error.
    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        Self::Unauthenticated {
            reason: reason.into(),
        }
    }
}

/// Bearer credential for the current session.
///
/// `Debug` output never contains the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wraps a raw bearer token.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw token for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&"<redacted>").finish()
    }
}

/// Identity of the signed-in patron, as recorded on borrow records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Borrower {
    /// Account email; borrow records are listed by it.
    pub email: String,
    /// Display name shown on the record.
    pub display_name: String,
}

impl Borrower {
    /// Creates a borrower identity.
    #[must_use]
    pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: display_name.into(),
        }
    }

    /// Returns true when both email and display name are non-blank.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.display_name.trim().is_empty()
    }
}

/// Supplies bearer credentials for authenticated store calls.
///
/// Implementations may suspend (e.g. to refresh a token).
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a token for the current session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Unauthenticated`] when no session exists.
    async fn get_token(&self) -> Result<Token, SessionError>;
}

#[async_trait]
impl<T: TokenProvider + ?Sized> TokenProvider for Arc<T> {
    async fn get_token(&self) -> Result<Token, SessionError> {
        (**self).get_token().await
    }
}

/// Provider holding a fixed token, or none for an anonymous session.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<Token>,
}

impl StaticTokenProvider {
    /// Creates a provider that always returns `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(Token::new(token)),
        }
    }

    /// Creates a provider for a signed-out session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> Result<Token, SessionError> {
        self.token
            .clone()
            .ok_or_else(|| SessionError::unauthenticated("signed out"))
    }
}

/// Provider reading the token from an environment variable on every call.
///
/// Re-reading lets an external sign-in helper rotate the token without
/// restarting the client.
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    /// Creates a provider reading `var`.
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Name of the variable this provider reads.
    #[must_use]
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_ENV)
    }
}

#[async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn get_token(&self) -> Result<Token, SessionError> {
        match std::env::var(&self.var) {
            Ok(value) if !value.trim().is_empty() => Ok(Token::new(value.trim())),
            _ => {
                debug!(var = %self.var, "token variable unset or empty");
                Err(SessionError::unauthenticated(format!(
                    "environment variable {} is not set",
                    self.var
                )))
            }
        }
    }
}
