use petdeck_store::StoreError;
use petdeck_types::TypeError;
use thiserror::Error;

/// Errors from catalog and service operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No authenticated member while not in desktop mode.
    #[error("not logged in or session expired")]
    Unauthorized,

    /// The member may not use the asset service.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A caller-supplied name or level failed validation.
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
