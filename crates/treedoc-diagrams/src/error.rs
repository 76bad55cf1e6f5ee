//! Diagram rendering errors.

/// Error returned by a [`Rasterizer`](crate::Rasterizer).
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    /// Rendering service request failed.
    #[error("diagram '{name}': HTTP error: {message}")]
    Http {
        /// Diagram display name.
        name: String,
        /// Error details.
        message: String,
    },
    /// Local rendering command failed.
    #[error("diagram '{name}': command `{program}` failed: {message}")]
    Command {
        /// Diagram display name.
        name: String,
        /// Program that was run.
        program: String,
        /// Error details (exit status, stderr).
        message: String,
    },
    /// Renderer returned no image data.
    #[error("diagram '{name}': renderer returned no output")]
    EmptyOutput {
        /// Diagram display name.
        name: String,
    },
}
