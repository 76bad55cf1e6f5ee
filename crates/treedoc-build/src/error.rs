//! Build errors.

use std::path::PathBuf;

use treedoc_diagrams::DiagramError;
use treedoc_render::PdfError;
use treedoc_tree::TreeError;

/// Error that aborts a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Source tree scanning failed.
    #[error(transparent)]
    Tree(#[from] TreeError),
    /// Diagram rendering failed.
    #[error(transparent)]
    Diagram(#[from] DiagramError),
    /// PDF conversion failed.
    #[error(transparent)]
    Pdf(#[from] PdfError),
    /// Writing output failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Worker pool could not be created.
    #[error("Failed to create worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    /// PDF output requested without a converter.
    #[error("PDF output is enabled but no PDF converter is configured")]
    MissingPdfConverter,
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
