//! CLI error types.

use rw_hast::ParseError;
use rw_mermaid_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {path}: {source}")]
    Parse { path: String, source: ParseError },

    #[error("{0}")]
    Transform(#[from] rw_mermaid::Error),
}
