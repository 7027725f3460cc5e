use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading layout input documents.
///
/// Layout passes themselves never fail; they degrade to dense or empty output.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("unknown hover target `{0}` (expected super:, category:, column: or edge:)")]
    UnknownHoverTarget(String),
}
