use std::path::PathBuf;

use petdeck_types::TypeError;

/// Errors from asset store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A caller-supplied name or level failed validation.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// A resolved path is not inside its designated root.
    #[error("path escapes its root: {0}")]
    PathEscape(PathBuf),

    /// The upload is not an image.
    #[error("unsupported media type: {0:?}")]
    UnsupportedMediaType(String),

    /// The upload exceeds the size limit.
    #[error("payload of {size} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { size: usize, max: usize },

    /// The pet type already exists in the user layer.
    #[error("pet type already exists: {0}")]
    Conflict(String),

    /// The pet type exists in neither the user layer nor the global library.
    #[error("pet type not found: {0}")]
    NotFound(String),

    /// I/O error from the underlying filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failure.
    #[error("directory scan failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
