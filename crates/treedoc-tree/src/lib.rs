//! Source folder tree for treedoc.
//!
//! This crate turns a documentation source directory into an immutable
//! [`Tree`] of [`FolderNode`]s:
//! - [`build_tree`]: depth-first scan collecting markdown fragments and diagram sources
//! - [`materialize_output_dirs`]: mirrors the folder shape under an output root
//! - [`paths`]: display names, output locations and relative links between folders
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use treedoc_tree::{ScanOptions, build_tree};
//!
//! let tree = build_tree(Path::new("docs"), &ScanOptions::default())?;
//! for node in tree.iter() {
//!     println!("{}{}", "  ".repeat(node.depth - 1), node.name);
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;
mod materialize;
mod node;
pub mod paths;

pub use builder::{ScanOptions, build_tree};
pub use error::TreeError;
pub use materialize::materialize_output_dirs;
pub use node::{Diagram, FolderNode, Tree};
