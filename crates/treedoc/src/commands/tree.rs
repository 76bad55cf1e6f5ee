//! `treedoc tree` command implementation.

use std::path::PathBuf;

use clap::Args;
use treedoc_config::{CliSettings, Config};
use treedoc_build::scan_options;
use treedoc_tree::{FolderNode, build_tree};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the tree command.
#[derive(Args)]
pub(crate) struct TreeArgs {
    /// Path to configuration file (default: auto-discover treedoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documentation source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,
}

impl TreeArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            ..CliSettings::default()
        };
        // Output settings are irrelevant to an outline
        let config = Config::load_for_scan(self.config.as_deref(), Some(&cli_settings))?;

        let tree = build_tree(&config.paths.source_dir, &scan_options(&config))?;
        for node in &tree {
            output.print(&outline_line(node));
        }
        output.detail(&format!(
            "{} folders, {} diagrams",
            tree.len(),
            tree.diagram_count()
        ));
        Ok(())
    }
}

/// One outline line: indented name with content counts.
fn outline_line(node: &FolderNode) -> String {
    let indent = "  ".repeat(node.depth - 1);
    let mut counts = Vec::new();
    if !node.fragments.is_empty() {
        counts.push(plural(node.fragments.len(), "fragment"));
    }
    if !node.diagrams.is_empty() {
        counts.push(plural(node.diagrams.len(), "diagram"));
    }
    if counts.is_empty() {
        format!("{indent}{}", node.name)
    } else {
        format!("{indent}{} ({})", node.name, counts.join(", "))
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use treedoc_tree::Diagram;

    use super::*;

    fn node(depth: usize, fragments: usize, diagrams: usize) -> FolderNode {
        FolderNode {
            path: PathBuf::from("/docs/api"),
            rel_path: vec!["api".to_owned()],
            name: "api".to_owned(),
            depth,
            parent: Some(PathBuf::from("/docs")),
            child_names: Vec::new(),
            fragments: vec!["text".to_owned(); fragments],
            diagrams: (0..diagrams)
                .map(|i| Diagram {
                    path: PathBuf::from(format!("/docs/api/d{i}.puml")),
                    name: format!("d{i}"),
                    source: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_outline_line() {
        assert_eq!(outline_line(&node(1, 0, 0)), "api");
        assert_eq!(outline_line(&node(2, 1, 0)), "  api (1 fragment)");
        assert_eq!(outline_line(&node(3, 2, 3)), "    api (2 fragments, 3 diagrams)");
    }
}
