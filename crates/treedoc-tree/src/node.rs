//! Folder nodes and the tree that owns them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Diagram source file found directly inside a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    /// Source file path as found on disk.
    pub path: PathBuf,
    /// File stem (e.g. `flow` for `flow.puml`), used as display name.
    pub name: String,
    /// Raw diagram source.
    pub source: String,
}

/// One directory of the source tree with its local content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    /// Source directory path.
    pub path: PathBuf,
    /// Path segments relative to the source root (empty for the root).
    pub rel_path: Vec<String>,
    /// Display name (homepage name for the root, base name otherwise).
    pub name: String,
    /// Nesting level, root = 1.
    pub depth: usize,
    /// Source path of the enclosing folder.
    pub parent: Option<PathBuf>,
    /// Immediate child folder names in enumeration order.
    pub child_names: Vec<String>,
    /// Markdown fragments directly inside this folder.
    pub fragments: Vec<String>,
    /// Diagram sources directly inside this folder.
    pub diagrams: Vec<Diagram>,
}

impl FolderNode {
    /// Whether this node is the source root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Breadcrumb path relative to the source root (e.g. `/guide/setup`).
    ///
    /// Returns `None` for the root node.
    #[must_use]
    pub fn breadcrumb(&self) -> Option<String> {
        if self.rel_path.is_empty() {
            return None;
        }
        Some(format!("/{}", self.rel_path.join("/")))
    }

    /// Relative directory of this node as a path.
    #[must_use]
    pub fn rel_dir(&self) -> PathBuf {
        self.rel_path.iter().collect()
    }
}

/// Immutable folder tree in depth-first pre-order.
///
/// The first node is always the source root.
#[derive(Debug, Clone)]
pub struct Tree {
    root: PathBuf,
    nodes: Vec<FolderNode>,
    index: HashMap<PathBuf, usize>,
}

impl Tree {
    pub(crate) fn new(root: PathBuf, nodes: Vec<FolderNode>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.path.clone(), i))
            .collect();
        Self { root, nodes, index }
    }

    /// Source root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All nodes in pre-order.
    #[must_use]
    pub fn nodes(&self) -> &[FolderNode] {
        &self.nodes
    }

    /// Iterate over nodes in pre-order.
    pub fn iter(&self) -> std::slice::Iter<'_, FolderNode> {
        self.nodes.iter()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by its source path.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&FolderNode> {
        self.index.get(path).map(|&i| &self.nodes[i])
    }

    /// Parent node of `node`, if any.
    #[must_use]
    pub fn parent_of(&self, node: &FolderNode) -> Option<&FolderNode> {
        node.parent.as_deref().and_then(|p| self.get(p))
    }

    /// Total number of diagram sources across all nodes.
    #[must_use]
    pub fn diagram_count(&self) -> usize {
        self.nodes.iter().map(|n| n.diagrams.len()).sum()
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = &'a FolderNode;
    type IntoIter = std::slice::Iter<'a, FolderNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(path: &str, rel: &[&str], parent: Option<&str>) -> FolderNode {
        FolderNode {
            path: PathBuf::from(path),
            rel_path: rel.iter().map(|s| (*s).to_owned()).collect(),
            name: rel.last().copied().unwrap_or("Home").to_owned(),
            depth: rel.len() + 1,
            parent: parent.map(PathBuf::from),
            child_names: Vec::new(),
            fragments: Vec::new(),
            diagrams: Vec::new(),
        }
    }

    #[test]
    fn test_breadcrumb() {
        assert_eq!(node("/docs", &[], None).breadcrumb(), None);
        assert_eq!(
            node("/docs/a/b", &["a", "b"], Some("/docs/a")).breadcrumb(),
            Some("/a/b".to_owned())
        );
    }

    #[test]
    fn test_parent_lookup() {
        let tree = Tree::new(
            PathBuf::from("/docs"),
            vec![
                node("/docs", &[], None),
                node("/docs/a", &["a"], Some("/docs")),
            ],
        );

        let child = tree.get(Path::new("/docs/a")).unwrap();
        assert_eq!(tree.parent_of(child).unwrap().path, PathBuf::from("/docs"));
        assert!(tree.parent_of(&tree.nodes()[0]).is_none());
        assert!(tree.nodes()[0].is_root());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_rel_dir() {
        let n = node("/docs/a/b", &["a", "b"], Some("/docs/a"));
        assert_eq!(n.rel_dir(), PathBuf::from("a").join("b"));
    }
}
