//! Tree scanning errors.

use std::path::PathBuf;

/// Error returned while scanning the source tree or mirroring it.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Source root does not exist or is not a directory.
    #[error("Source directory not found: {}", .0.display())]
    MissingRoot(PathBuf),
    /// I/O error on a specific path.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl TreeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
