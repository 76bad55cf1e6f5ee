//! Folder tree construction by filesystem walking.
//!
//! The builder visits directories depth-first and emits one [`FolderNode`] per
//! directory in pre-order: a node is appended before any of its descendants.
//! Scanning is pure with respect to the output location; mirroring the folder
//! shape elsewhere is [`materialize_output_dirs`](crate::materialize_output_dirs).

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::TreeError;
use crate::node::{Diagram, FolderNode, Tree};
use crate::paths::display_name;

/// Options controlling which files become fragments or diagrams.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Display name used for the root folder.
    pub homepage_name: String,
    /// Entries whose name starts with this prefix are skipped with their subtree.
    pub exclude_prefix: String,
    /// Extension of markdown fragments (case-insensitive, without dot).
    pub markdown_extension: String,
    /// Extension of diagram sources (case-insensitive, without dot).
    pub diagram_extension: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            homepage_name: "Home".to_owned(),
            exclude_prefix: "_".to_owned(),
            markdown_extension: "md".to_owned(),
            diagram_extension: "puml".to_owned(),
        }
    }
}

/// Scan `root` and build the folder tree.
///
/// Directory entries are sorted by name so the result is deterministic.
///
/// # Errors
///
/// Returns [`TreeError::MissingRoot`] if `root` is not a directory, and
/// [`TreeError::Io`] for any unreadable directory or file. No partial tree is
/// returned.
pub fn build_tree(root: &Path, options: &ScanOptions) -> Result<Tree, TreeError> {
    if !root.is_dir() {
        return Err(TreeError::MissingRoot(root.to_path_buf()));
    }

    let mut builder = TreeBuilder {
        root,
        options,
        nodes: Vec::new(),
    };
    builder.visit(root, Vec::new(), None)?;

    tracing::debug!(
        root = %root.display(),
        folders = builder.nodes.len(),
        "Tree scan completed"
    );
    Ok(Tree::new(root.to_path_buf(), builder.nodes))
}

/// Directory entry with cached type information.
struct Entry {
    path: PathBuf,
    name: String,
    is_dir: bool,
}

struct TreeBuilder<'a> {
    root: &'a Path,
    options: &'a ScanOptions,
    nodes: Vec<FolderNode>,
}

impl TreeBuilder<'_> {
    /// Visit a directory: append its node, recurse into children, then
    /// collect the directory's own fragments and diagrams.
    fn visit(
        &mut self,
        dir: &Path,
        rel_path: Vec<String>,
        parent: Option<PathBuf>,
    ) -> Result<(), TreeError> {
        let index = self.nodes.len();
        self.nodes.push(FolderNode {
            path: dir.to_path_buf(),
            name: display_name(self.root, dir, &self.options.homepage_name),
            depth: rel_path.len() + 1,
            rel_path,
            parent,
            child_names: Vec::new(),
            fragments: Vec::new(),
            diagrams: Vec::new(),
        });

        let entries = self.read_entries(dir)?;
        let (dirs, files): (Vec<_>, Vec<_>) = entries.into_iter().partition(|e| e.is_dir);

        for child in dirs {
            tracing::debug!(path = %child.path.display(), "Visiting folder");
            let mut child_rel = self.nodes[index].rel_path.clone();
            child_rel.push(child.name.clone());
            self.nodes[index].child_names.push(child.name);
            self.visit(&child.path, child_rel, Some(dir.to_path_buf()))?;
        }

        for file in files {
            let Some(ext) = file.path.extension().map(|e| e.to_string_lossy()) else {
                continue;
            };
            if ext.eq_ignore_ascii_case(&self.options.markdown_extension) {
                let content = read_file(&file.path)?;
                self.nodes[index].fragments.push(content);
            } else if ext.eq_ignore_ascii_case(&self.options.diagram_extension) {
                let source = read_file(&file.path)?;
                let name = file
                    .path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.nodes[index].diagrams.push(Diagram {
                    path: file.path.clone(),
                    name,
                    source,
                });
            }
        }

        Ok(())
    }

    /// Read directory entries, dropping excluded names, sorted by name.
    fn read_entries(&self, dir: &Path) -> Result<Vec<Entry>, TreeError> {
        let read_dir = fs::read_dir(dir).map_err(|e| TreeError::io(dir, e))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| TreeError::io(dir, e))?;
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy().into_owned();
            if file_name.to_str().is_none() {
                tracing::warn!(name = %name, dir = %dir.display(), "Non-UTF-8 entry name");
            }
            if name.starts_with(self.options.exclude_prefix.as_str()) {
                tracing::debug!(name = %name, "Skipping excluded entry");
                continue;
            }
            let path = entry.path();
            let is_dir = entry
                .file_type()
                .map_err(|e| TreeError::io(&path, e))?
                .is_dir();
            entries.push(Entry { path, name, is_dir });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

fn read_file(path: &Path) -> Result<String, TreeError> {
    fs::read_to_string(path).map_err(|e| TreeError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn names(tree: &Tree) -> Vec<&str> {
        tree.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_build_single_folder() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("README.md"), "Hello").unwrap();

        let tree = build_tree(temp_dir.path(), &ScanOptions::default()).unwrap();

        assert_eq!(tree.len(), 1);
        let root = &tree.nodes()[0];
        assert_eq!(root.name, "Home");
        assert_eq!(root.depth, 1);
        assert!(root.parent.is_none());
        assert_eq!(root.fragments, vec!["Hello".to_owned()]);
    }

    #[test]
    fn test_build_pre_order_with_depths() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("a").join("a1")).unwrap();
        fs::create_dir_all(root.join("b")).unwrap();

        let tree = build_tree(root, &ScanOptions::default()).unwrap();

        assert_eq!(names(&tree), vec!["Home", "a", "a1", "b"]);
        let depths: Vec<_> = tree.iter().map(|n| n.depth).collect();
        assert_eq!(depths, vec![1, 2, 3, 2]);
        for node in &tree {
            assert_eq!(node.depth, node.rel_path.len() + 1);
        }
        assert_eq!(tree.nodes()[0].child_names, vec!["a", "b"]);
        assert_eq!(tree.nodes()[2].parent.as_deref(), Some(root.join("a").as_path()));
    }

    #[test]
    fn test_build_excludes_prefixed_entries() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        fs::write(root.join("README.md"), "Hello").unwrap();
        fs::write(root.join("_draft.md"), "Draft").unwrap();
        fs::create_dir_all(root.join("_hidden").join("deep")).unwrap();
        fs::write(root.join("_hidden").join("README.md"), "Skip").unwrap();
        fs::write(root.join("_secret.puml"), "@startuml\n@enduml").unwrap();

        let tree = build_tree(root, &ScanOptions::default()).unwrap();

        assert_eq!(tree.len(), 1);
        let node = &tree.nodes()[0];
        assert!(node.child_names.is_empty());
        assert_eq!(node.fragments, vec!["Hello".to_owned()]);
        assert!(node.diagrams.is_empty());
    }

    #[test]
    fn test_build_collects_diagrams_case_insensitive() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        fs::write(root.join("flow.puml"), "@startuml\nA -> B\n@enduml").unwrap();
        fs::write(root.join("Other.PUML"), "@startuml\nC -> D\n@enduml").unwrap();
        fs::write(root.join("NOTES.MD"), "Notes").unwrap();
        fs::write(root.join("image.png"), [0u8, 1, 2]).unwrap();

        let tree = build_tree(root, &ScanOptions::default()).unwrap();

        let node = &tree.nodes()[0];
        let diagram_names: Vec<_> = node.diagrams.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(diagram_names, vec!["Other", "flow"]);
        assert_eq!(node.diagrams[1].source, "@startuml\nA -> B\n@enduml");
        // The real file name is kept, whatever the extension case
        assert_eq!(node.diagrams[0].path, root.join("Other.PUML"));
        assert_eq!(node.fragments, vec!["Notes".to_owned()]);
    }

    #[test]
    fn test_fragments_are_folder_local() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        fs::write(root.join("README.md"), "Hello").unwrap();
        fs::create_dir(root.join("child")).unwrap();
        fs::write(root.join("child").join("README.md"), "World").unwrap();

        let tree = build_tree(root, &ScanOptions::default()).unwrap();

        assert_eq!(tree.nodes()[0].fragments, vec!["Hello".to_owned()]);
        assert_eq!(tree.nodes()[1].fragments, vec!["World".to_owned()]);
        assert_eq!(tree.nodes()[1].breadcrumb(), Some("/child".to_owned()));
    }

    #[test]
    fn test_build_is_idempotent() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("x").join("y")).unwrap();
        fs::write(root.join("x").join("a.md"), "A").unwrap();
        fs::write(root.join("x").join("b.md"), "B").unwrap();
        fs::write(root.join("x").join("y").join("d.puml"), "D").unwrap();

        let first = build_tree(root, &ScanOptions::default()).unwrap();
        let second = build_tree(root, &ScanOptions::default()).unwrap();

        assert_eq!(first.nodes(), second.nodes());
    }

    #[test]
    fn test_build_custom_options() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        fs::write(root.join("page.markdown"), "Page").unwrap();
        fs::write(root.join("seq.uml"), "A -> B").unwrap();
        fs::create_dir(root.join(".git")).unwrap();

        let options = ScanOptions {
            homepage_name: "Overview".to_owned(),
            exclude_prefix: ".".to_owned(),
            markdown_extension: "markdown".to_owned(),
            diagram_extension: "uml".to_owned(),
        };
        let tree = build_tree(root, &options).unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.nodes()[0].name, "Overview");
        assert_eq!(tree.nodes()[0].fragments, vec!["Page".to_owned()]);
        assert_eq!(tree.nodes()[0].diagrams[0].name, "seq");
    }

    #[test]
    fn test_build_missing_root() {
        let result = build_tree(Path::new("/nonexistent/treedoc"), &ScanOptions::default());
        assert!(matches!(result, Err(TreeError::MissingRoot(_))));
    }

    #[test]
    fn test_build_unreadable_fragment_fails() {
        let temp_dir = create_test_dir();
        // Invalid UTF-8 cannot be read as a fragment
        fs::write(temp_dir.path().join("bad.md"), [0xff, 0xfe, 0xfd]).unwrap();

        let result = build_tree(temp_dir.path(), &ScanOptions::default());
        assert!(matches!(result, Err(TreeError::Io { .. })));
    }
}
