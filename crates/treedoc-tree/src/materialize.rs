//! Output directory mirroring.

use std::fs;
use std::path::Path;

use crate::error::TreeError;
use crate::node::Tree;
use crate::paths::output_dir;

/// Create one output directory per tree node under `output_root`.
///
/// After this pass renderers can write `<output_root>/<rel path>/<file>`
/// without creating intermediate directories. Returns the number of
/// directories ensured.
///
/// # Errors
///
/// Returns [`TreeError::Io`] if a directory cannot be created.
pub fn materialize_output_dirs(tree: &Tree, output_root: &Path) -> Result<usize, TreeError> {
    for node in tree {
        let dir = output_dir(output_root, &node.rel_path);
        fs::create_dir_all(&dir).map_err(|e| TreeError::io(&dir, e))?;
    }
    tracing::debug!(
        output = %output_root.display(),
        folders = tree.len(),
        "Output folders created"
    );
    Ok(tree.len())
}
