//! Scoped scratch files for handing multi-line content to the engine.

use std::{
    io::{self, Write},
    path::Path,
};

use tempfile::{Builder, NamedTempFile};

/// A temporary file that is removed when it goes out of scope.
///
/// Call [`ScratchFile::remove`] on the normal path to get the removal logged;
/// any other exit (early return, panic, cancelled future) still deletes the
/// file through `Drop`.
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    /// Create a file in `dir` whose name starts with `prefix` and write `contents`.
    pub fn create(dir: &Path, prefix: &str, contents: &str) -> io::Result<Self> {
        let mut file = Builder::new().prefix(prefix).tempfile_in(dir)?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        tracing::debug!("Created scratch file {}", file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file. Failures are logged, never returned.
    pub fn remove(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            tracing::warn!("Failed to remove scratch file {}: {e}", path.display());
        }
    }
}
