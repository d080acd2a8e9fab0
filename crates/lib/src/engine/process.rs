//! Subprocess implementation of [`LineEngine`].

use std::{
    path::{Path, PathBuf},
    process::{Output, Stdio},
    time::Duration,
};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use super::{EngineCommand, EngineError, LineEngine, LineRecord};
use crate::auth::UserId;

/// Default upper bound on a single engine call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the Line Engine program once per operation.
///
/// Each call spawns `program` inside `work_dir` with stdin closed and both
/// output streams captured. A call that outlives `timeout`, or whose
/// cancellation token fires, kills the child before returning.
#[derive(Clone, Debug)]
pub struct ProcessEngine {
    program: PathBuf,
    work_dir: PathBuf,
    timeout: Duration,
    cancel: CancellationToken,
}

impl ProcessEngine {
    pub fn new(program: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            work_dir: work_dir.into(),
            timeout: DEFAULT_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Abort in-flight and future calls when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Path of the program to spawn.
    ///
    /// A relative path with a directory part (`./Lynx`) is taken relative to
    /// the working directory, the way the engine is laid out in a build tree.
    /// A bare name is looked up on `PATH`.
    pub fn program(&self) -> PathBuf {
        if self.program.is_relative() && self.program.components().count() > 1 {
            self.work_dir.join(&self.program)
        } else {
            self.program.clone()
        }
    }

    /// Run one command and return its stdout on success.
    async fn run(&self, user: &UserId, command: EngineCommand<'_>) -> Result<Vec<u8>, EngineError> {
        let name = command.name();
        let program = self.program();
        tracing::debug!(user = %user, command = name, "Invoking line engine");

        let child = Command::new(&program)
            .args(command.argv(user))
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: program.clone(),
                source,
            })?;

        // Dropping `wait_with_output` drops the child, and kill_on_drop reaps it.
        let output: Output = tokio::select! {
            waited = tokio::time::timeout(self.timeout, child.wait_with_output()) => match waited {
                Ok(result) => result.map_err(|source| EngineError::Io { command: name, source })?,
                Err(_) => {
                    tracing::error!(command = name, "Line engine timed out after {:?}", self.timeout);
                    return Err(EngineError::Timeout { command: name, after: self.timeout });
                }
            },
            _ = self.cancel.cancelled() => {
                tracing::warn!(command = name, "Line engine call cancelled");
                return Err(EngineError::Cancelled { command: name });
            }
        };

        if !output.status.success() {
            let diagnostic = diagnostic_text(&output);
            tracing::warn!(
                command = name,
                code = ?output.status.code(),
                "Line engine rejected request: {diagnostic}"
            );
            return Err(EngineError::Rejected {
                command: name,
                code: output.status.code(),
                diagnostic,
            });
        }

        tracing::trace!(
            command = name,
            "Line engine output: {}",
            String::from_utf8_lossy(&output.stdout)
        );
        Ok(output.stdout)
    }

    async fn run_json<T: DeserializeOwned>(
        &self,
        user: &UserId,
        command: EngineCommand<'_>,
    ) -> Result<T, EngineError> {
        let name = command.name();
        let stdout = self.run(user, command).await?;
        serde_json::from_slice(&stdout).map_err(|source| {
            tracing::error!(command = name, "Undecodable line engine output: {source}");
            EngineError::Protocol {
                command: name,
                source,
            }
        })
    }
}

/// The engine's stderr, or its stdout when stderr is empty.
fn diagnostic_text(output: &Output) -> String {
    if output.stderr.is_empty() {
        String::from_utf8_lossy(&output.stdout).into_owned()
    } else {
        String::from_utf8_lossy(&output.stderr).into_owned()
    }
}

#[async_trait]
impl LineEngine for ProcessEngine {
    async fn list_files(&self, user: &UserId) -> Result<Vec<String>, EngineError> {
        self.run_json(user, EngineCommand::ListFiles).await
    }

    async fn fetch_lines(&self, user: &UserId, file: &str) -> Result<Vec<LineRecord>, EngineError> {
        self.run_json(user, EngineCommand::Lines { file }).await
    }

    async fn set_flagged(
        &self,
        user: &UserId,
        file: &str,
        line: i64,
        starred: bool,
    ) -> Result<(), EngineError> {
        self.run(
            user,
            EngineCommand::SetFlagged {
                file,
                line,
                starred,
            },
        )
        .await
        .map(drop)
    }

    async fn set_notes(
        &self,
        user: &UserId,
        file: &str,
        line: i64,
        text: &str,
    ) -> Result<(), EngineError> {
        self.run(user, EngineCommand::SetNotes { file, line, text })
            .await
            .map(drop)
    }

    async fn add_set(
        &self,
        user: &UserId,
        title: &str,
        content: &Path,
    ) -> Result<(), EngineError> {
        self.run(user, EngineCommand::AddSet { title, content })
            .await
            .map(drop)
    }
}
