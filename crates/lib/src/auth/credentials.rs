//! Fixed username/password table.
//!
//! Credential persistence is outside Feline; the table is built once at
//! startup and only read afterwards.

use std::collections::HashMap;

use super::{AuthError, UserId};

/// Users known to a default server.
const DEFAULT_USERS: &[(&str, &str)] = &[("rustum", "ruu"), ("calcifer", "cal")];

/// Username to password lookup used by the login handler.
#[derive(Clone, Debug)]
pub struct CredentialTable {
    users: HashMap<String, String>,
}

impl CredentialTable {
    /// Build a table from `(username, password)` pairs.
    pub fn new<I, U, P>(users: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            users: users
                .into_iter()
                .map(|(u, p)| (u.into(), p.into()))
                .collect(),
        }
    }

    /// Check a username/password pair.
    ///
    /// Unknown usernames and wrong passwords fail with different variants so
    /// the login page can tell the user which one it was.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<UserId, AuthError> {
        let expected = self
            .users
            .get(username)
            .ok_or_else(|| AuthError::UserNotFound {
                username: username.to_string(),
            })?;

        if expected != password {
            return Err(AuthError::BadPassword {
                username: username.to_string(),
            });
        }

        Ok(UserId::new(username))
    }
}

impl Default for CredentialTable {
    fn default() -> Self {
        Self::new(DEFAULT_USERS.iter().copied())
    }
}
