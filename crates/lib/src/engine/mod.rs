//! Client side of the external Line Engine
//!
//! The Line Engine is a separate program that owns line-set storage and review
//! data. Feline talks to it through five operations, described by
//! [`LineEngine`]. [`ProcessEngine`] runs the real program as a subprocess;
//! tests substitute their own implementations.
//!
//! Every invocation has the shape
//!
//! ```text
//! <engine> --user <identity> <command> [args...]
//! ```
//!
//! with JSON replies on stdout, diagnostics on stderr and exit code 0 for success.

pub mod errors;
pub mod process;
pub mod scratch;

pub use errors::EngineError;
pub use process::ProcessEngine;
pub use scratch::ScratchFile;

use std::{ffi::OsString, path::Path};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::auth::UserId;

/// A single line of a line-set as reported by the engine.
///
/// Read-only on the Feline side: changes go through
/// [`LineEngine::set_flagged`] / [`LineEngine::set_notes`] and the record is
/// replaced by fetching the lines again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    pub id: i64,
    pub cue: String,
    pub line: String,
    #[serde(default)]
    pub starred: bool,
    #[serde(default)]
    pub notes: String,
}

/// The operations Feline asks of the Line Engine.
#[async_trait]
pub trait LineEngine: Send + Sync {
    /// Identifiers of the line-set files available to `user`.
    async fn list_files(&self, user: &UserId) -> Result<Vec<String>, EngineError>;

    /// All lines of `file`, in engine order.
    async fn fetch_lines(&self, user: &UserId, file: &str) -> Result<Vec<LineRecord>, EngineError>;

    /// Star or unstar a line.
    async fn set_flagged(
        &self,
        user: &UserId,
        file: &str,
        line: i64,
        starred: bool,
    ) -> Result<(), EngineError>;

    /// Replace the notes attached to a line.
    async fn set_notes(
        &self,
        user: &UserId,
        file: &str,
        line: i64,
        text: &str,
    ) -> Result<(), EngineError>;

    /// Store a new line-set named `title` from the file at `content`.
    async fn add_set(&self, user: &UserId, title: &str, content: &Path)
    -> Result<(), EngineError>;
}

/// One engine command with its arguments, before the `--user` prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineCommand<'a> {
    ListFiles,
    Lines { file: &'a str },
    SetFlagged { file: &'a str, line: i64, starred: bool },
    SetNotes { file: &'a str, line: i64, text: &'a str },
    AddSet { title: &'a str, content: &'a Path },
}

impl EngineCommand<'_> {
    /// The engine's name for this command.
    pub fn name(&self) -> &'static str {
        match self {
            EngineCommand::ListFiles => "list-files",
            EngineCommand::Lines { .. } => "lines",
            EngineCommand::SetFlagged { .. } => "set-flagged",
            EngineCommand::SetNotes { .. } => "set-notes",
            EngineCommand::AddSet { .. } => "add-set",
        }
    }

    /// Full argument vector for `user`, starting with `--user <identity>`.
    ///
    /// User-typed values (titles, notes) are passed as single arguments and
    /// never go through a shell.
    pub fn argv(&self, user: &UserId) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--user".into(), user.as_str().into(), self.name().into()];
        match self {
            EngineCommand::ListFiles => {}
            EngineCommand::Lines { file } => {
                args.push("--file".into());
                args.push((*file).into());
            }
            EngineCommand::SetFlagged {
                file,
                line,
                starred,
            } => {
                args.push((*file).into());
                args.push(line.to_string().into());
                args.push(starred.to_string().into());
            }
            EngineCommand::SetNotes { file, line, text } => {
                args.push((*file).into());
                args.push(line.to_string().into());
                args.push((*text).into());
            }
            EngineCommand::AddSet { title, content } => {
                args.push((*title).into());
                args.push(content.as_os_str().to_owned());
            }
        }
        args
    }
}
