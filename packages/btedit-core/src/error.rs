use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by tree edits, address lookups, and document conversion.
/// A failed operation never leaves a half-applied mutation behind.
#[derive(Error, Debug)]
pub enum Error {
    #[error("illegal operation: {0}")]
    IllegalOperation(String),
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(String),
    #[error("unknown or stale address: {0}")]
    UnknownAddress(String),
    #[error("behavior not in library: {0}")]
    UnknownBehavior(String),
    #[error("malformed document: {0}")]
    MalformedDocument(String),
}
