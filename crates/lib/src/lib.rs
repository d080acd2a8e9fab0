//!
//! Feline: line-by-line study sessions in the browser.
//! This library holds the session layer of the Feline server: who is logged in,
//! where each user is in the review flow, and how requests are put to the
//! external Line Engine that stores the line-sets.
//!
//! ## Core Concepts
//!
//! * **Credentials and tokens (`auth`)**: a fixed credential table checks logins; the
//!   [`TokenStore`](auth::TokenStore) maps opaque session tokens to a [`UserId`](auth::UserId).
//! * **Sessions (`session`)**: one [`Session`](session::Session) per user, holding the
//!   current [`Page`](session::Page), the selected line-set and the builder draft.
//!   Sessions survive logout.
//! * **Line Engine (`engine`)**: the [`LineEngine`](engine::LineEngine) trait and its
//!   subprocess implementation [`ProcessEngine`](engine::ProcessEngine).
//! * **Navigation (`navigation`)**: the [`Navigator`](navigation::Navigator) validates
//!   each request against the session's location and performs the transition.

pub mod auth;
pub mod engine;
pub mod navigation;
pub mod session;

/// Result type used throughout the Feline library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Feline library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured authentication errors from the auth module
    #[error(transparent)]
    Auth(auth::AuthError),

    /// Structured navigation errors from the navigation module
    #[error(transparent)]
    Navigation(navigation::NavigationError),

    /// Structured Line Engine errors from the engine module
    #[error(transparent)]
    Engine(engine::EngineError),

    /// A local resource (scratch file) could not be set up.
    #[error("Resource error: {reason}: {source}")]
    Resource {
        reason: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Auth(_) => "auth",
            Error::Navigation(_) => "navigation",
            Error::Engine(_) => "engine",
            Error::Resource { .. } => "resource",
        }
    }

    /// Check if the caller should be sent back to the login page.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Check if this error was caused by a bad request rather than a failure.
    ///
    /// Client errors are detected before any session state is touched.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Navigation(_))
    }

    /// The engine's diagnostic, if the engine explicitly rejected the request.
    pub fn engine_diagnostic(&self) -> Option<&str> {
        match self {
            Error::Engine(e) => e.diagnostic(),
            _ => None,
        }
    }
}
