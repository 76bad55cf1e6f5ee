//! CLI error types.

use treedoc_build::BuildError;
use treedoc_config::ConfigError;
use treedoc_tree::TreeError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("{0}")]
    Build(#[from] BuildError),
}
