//! Session token issuing and lookup
//!
//! Provides in-memory storage mapping session tokens to authenticated user identities.

use std::{collections::HashMap, fmt, sync::Arc};

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{RngCore, rngs::OsRng};
use tokio::sync::RwLock;

use super::{AuthError, UserId};

/// Number of random bytes behind each token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Opaque session token stored in the login cookie.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn generate() -> Result<Self, rand::Error> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(Self(Base64UrlUnpadded::encode_string(&bytes)))
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// In-memory token store
///
/// Tokens never expire; they live until [`TokenStore::revoke`] or a server
/// restart. Cloning the store shares the underlying map.
#[derive(Clone, Default)]
pub struct TokenStore {
    tokens: Arc<RwLock<HashMap<SessionToken, UserId>>>,
}

impl TokenStore {
    /// Create a new empty token store
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token for `user` and record the mapping.
    ///
    /// A failing OS RNG is retried once before giving up.
    pub async fn issue(&self, user: UserId) -> Result<SessionToken, AuthError> {
        let token = match SessionToken::generate() {
            Ok(token) => token,
            Err(first) => {
                tracing::warn!("Session token generation failed, retrying: {first}");
                SessionToken::generate().map_err(|e| AuthError::TokenGeneration {
                    reason: e.to_string(),
                })?
            }
        };

        tracing::debug!(user = %user, "Issued session token");
        let mut tokens = self.tokens.write().await;
        tokens.insert(token.clone(), user);
        Ok(token)
    }

    /// Look up the user a token was issued to.
    pub async fn resolve(&self, token: &SessionToken) -> Result<UserId, AuthError> {
        let tokens = self.tokens.read().await;
        tokens.get(token).cloned().ok_or(AuthError::InvalidToken)
    }

    /// Forget a token. Revoking an unknown token is a no-op.
    pub async fn revoke(&self, token: &SessionToken) {
        let mut tokens = self.tokens.write().await;
        if let Some(user) = tokens.remove(token) {
            tracing::debug!(user = %user, "Revoked session token");
        }
    }

    /// Number of live tokens
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}
