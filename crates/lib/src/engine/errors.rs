//! Line Engine error types.
//!
//! `Rejected` means the engine ran and refused the request; its diagnostic is
//! kept byte-for-byte because the builder form shows it to the user.
//! `Protocol` means the engine claimed success but its output could not be decoded.

use std::{io, path::PathBuf, time::Duration};

use thiserror::Error as ThisError;

use crate::Error;

/// Errors produced while talking to the external Line Engine.
#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum EngineError {
    /// The engine process could not be started.
    #[error("Failed to start line engine {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Waiting on the engine process failed.
    #[error("Line engine `{command}` I/O failure: {source}")]
    Io {
        command: &'static str,
        #[source]
        source: io::Error,
    },

    /// The engine exited non-zero.
    #[error("Line engine `{command}` rejected the request: {diagnostic}")]
    Rejected {
        command: &'static str,
        /// Exit code, `None` when the process was killed by a signal
        code: Option<i32>,
        /// The engine's own diagnostic text, unmodified
        diagnostic: String,
    },

    /// The engine succeeded but its reply could not be decoded.
    #[error("Line engine `{command}` produced unparsable output: {source}")]
    Protocol {
        command: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The engine did not finish within the configured timeout and was killed.
    #[error("Line engine `{command}` timed out after {after:?}")]
    Timeout {
        command: &'static str,
        after: Duration,
    },

    /// The engine call was cancelled and the process was killed.
    #[error("Line engine `{command}` was cancelled")]
    Cancelled { command: &'static str },
}

impl EngineError {
    /// The engine's diagnostic text when it explicitly rejected a request.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            EngineError::Rejected { diagnostic, .. } => Some(diagnostic),
            _ => None,
        }
    }

    /// Check if the engine explicitly rejected the request.
    pub fn is_rejected(&self) -> bool {
        matches!(self, EngineError::Rejected { .. })
    }

    /// Check if the engine's output could not be decoded.
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, EngineError::Protocol { .. })
    }

    /// Check if the call was abandoned by timeout or cancellation.
    pub fn is_abandoned(&self) -> bool {
        matches!(
            self,
            EngineError::Timeout { .. } | EngineError::Cancelled { .. }
        )
    }
}

impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        Error::Engine(err)
    }
}
