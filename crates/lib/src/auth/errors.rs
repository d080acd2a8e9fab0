//! Authentication error types for Feline.
//!
//! Login failures keep `UserNotFound` and `BadPassword` apart because the
//! login form reports them with different messages.

use thiserror::Error as ThisError;

use crate::Error;

/// Errors that can occur while authenticating a user or resolving a session token.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum AuthError {
    /// The username is not present in the credential table.
    #[error("User not found: {username}")]
    UserNotFound {
        /// The username that was looked up
        username: String,
    },

    /// The username exists but the password did not match.
    #[error("Password incorrect for user: {username}")]
    BadPassword {
        /// The username whose password was rejected
        username: String,
    },

    /// The presented session token was never issued or has been revoked.
    #[error("Invalid session token")]
    InvalidToken,

    /// The operating system RNG failed twice in a row while issuing a token.
    #[error("Failed to generate session token: {reason}")]
    TokenGeneration {
        /// Description of the RNG failure
        reason: String,
    },
}

impl AuthError {
    /// The message shown on the login form for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::UserNotFound { .. } => "Sorry, username not found.",
            AuthError::BadPassword { .. } => "Sorry, password incorrect.",
            AuthError::InvalidToken => "Your session has expired, please log in again.",
            AuthError::TokenGeneration { .. } => "Sorry, login is unavailable right now.",
        }
    }

    /// Check if this error came from a failed credential check.
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            AuthError::UserNotFound { .. } | AuthError::BadPassword { .. }
        )
    }

    /// Check if this error indicates an unknown or revoked token.
    pub fn is_invalid_token(&self) -> bool {
        matches!(self, AuthError::InvalidToken)
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::Auth(err)
    }
}
