//! Navigation error types.

use thiserror::Error as ThisError;

use crate::{Error, session::Location};

/// Errors from validating a navigation request against the session.
///
/// All of these are client errors: the request was rejected before any
/// session state changed.
#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum NavigationError {
    /// The file index is not an integer or is outside the listed files.
    #[error("Invalid file selection '{input}' ({available} files available)")]
    InvalidSelection {
        /// The raw value that was submitted
        input: String,
        /// Length of the file list shown to the user
        available: usize,
    },

    /// The review method selector is empty or unknown.
    #[error("Invalid review method '{input}'")]
    InvalidReviewMethod { input: String },

    /// The operation only makes sense on another page.
    #[error("Operation requires location {expected}, session is at {actual}")]
    WrongLocation {
        expected: Location,
        actual: Location,
    },

    /// A line-set operation was attempted before any line-set was chosen.
    #[error("No line-set selected")]
    NoFileSelected,
}

impl NavigationError {
    /// Check if this error is about the session being on another page.
    pub fn is_wrong_location(&self) -> bool {
        matches!(self, NavigationError::WrongLocation { .. })
    }
}

impl From<NavigationError> for Error {
    fn from(err: NavigationError) -> Self {
        Error::Navigation(err)
    }
}
