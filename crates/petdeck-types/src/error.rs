use thiserror::Error;

/// Errors produced by type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid name: {0:?}")]
    InvalidName(String),

    #[error("level must be between 1 and {max}, got {level}")]
    InvalidLevel { level: i64, max: u8 },
}
