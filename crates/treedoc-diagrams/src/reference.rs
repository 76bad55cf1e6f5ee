//! Render-time diagram references.

use treedoc_tree::{Diagram, FolderNode};

use crate::format::ImageFormat;

/// Reference to one diagram of a folder, derived at render time.
///
/// Carries enough information to locate a pre-rendered image
/// (`<folder>/<name>.<format>`) or to compute a remote URL from the source.
#[derive(Debug, Clone, Copy)]
pub struct DiagramRef<'a> {
    /// Folder segments relative to the source root.
    pub folder: &'a [String],
    /// Display name (file stem of the diagram source).
    pub name: &'a str,
    /// Raw diagram source.
    pub source: &'a str,
}

impl<'a> DiagramRef<'a> {
    /// Create a reference from its parts.
    #[must_use]
    pub fn new(folder: &'a [String], name: &'a str, source: &'a str) -> Self {
        Self {
            folder,
            name,
            source,
        }
    }

    /// Reference to `diagram` inside `node`.
    #[must_use]
    pub fn from_node(node: &'a FolderNode, diagram: &'a Diagram) -> Self {
        Self::new(&node.rel_path, &diagram.name, &diagram.source)
    }

    /// All diagram references of `node` in enumeration order.
    pub fn all(node: &'a FolderNode) -> impl Iterator<Item = DiagramRef<'a>> {
        node.diagrams.iter().map(move |d| Self::from_node(node, d))
    }

    /// File name of the pre-rendered image.
    #[must_use]
    pub fn image_file_name(&self, format: ImageFormat) -> String {
        format!("{}.{}", self.name, format.as_str())
    }
}
