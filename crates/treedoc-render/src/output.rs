//! Rendered artifacts waiting to be written.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One output file: target path and contents.
///
/// Renderers produce these without touching the filesystem; the build
/// orchestrator decides when and on which worker they are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    /// Absolute or output-root-based target path.
    pub path: PathBuf,
    /// File contents.
    pub contents: Vec<u8>,
}

impl OutputFile {
    /// Create an output file from raw bytes.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    /// Create an output file from text.
    #[must_use]
    pub fn text(path: impl Into<PathBuf>, text: String) -> Self {
        Self::new(path, text.into_bytes())
    }

    /// Contents as text, if valid UTF-8.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.contents).ok()
    }

    /// Write the file. The parent directory must exist.
    pub fn write(&self) -> io::Result<()> {
        fs::write(&self.path, &self.contents)?;
        tracing::debug!(path = %self.path.display(), bytes = self.contents.len(), "Wrote output file");
        Ok(())
    }

    /// Target path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
