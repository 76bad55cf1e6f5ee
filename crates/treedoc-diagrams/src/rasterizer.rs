//! Seam to the external diagram renderer.

use std::path::Path;

use crate::error::DiagramError;
use crate::format::ImageFormat;

/// One diagram to render.
#[derive(Debug, Clone, Copy)]
pub struct DiagramJob<'a> {
    /// Source file path (for renderers that read from disk and for messages).
    pub source_path: &'a Path,
    /// Display name.
    pub name: &'a str,
    /// Raw diagram source.
    pub source: &'a str,
    /// Desired output format.
    pub format: ImageFormat,
}

/// Renders diagram sources to image bytes.
///
/// Implementations must be shareable across worker threads; a build renders
/// many diagrams concurrently through the same instance.
pub trait Rasterizer: Send + Sync {
    /// Render one diagram and return the encoded image.
    fn rasterize(&self, job: &DiagramJob<'_>) -> Result<Vec<u8>, DiagramError>;
}
