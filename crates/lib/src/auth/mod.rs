//! Authentication for Feline
//!
//! Two pieces live here: the fixed credential table used to check a login, and
//! the token store that maps issued session tokens back to user identities.

pub mod credentials;
pub mod errors;
pub mod token;

pub use credentials::CredentialTable;
pub use errors::AuthError;
pub use token::{SessionToken, TokenStore};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier for an authenticated user.
///
/// Derived from the username. One identity owns at most one live
/// [`Session`](crate::session::Session).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(username: impl Into<String>) -> Self {
        Self(username.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
