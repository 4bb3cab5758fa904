use thiserror::Error;

/// Returned when a string is not one of `minimal`, `low` or `high`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown quality level `{0}` (expected minimal, low or high)")]
pub struct ParseQualityError(pub String);

/// Failure reported by a [`KeyValueStore`](crate::KeyValueStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage is not available: {0}")]
    Unavailable(String),
    #[error("storage read failed for `{key}`: {reason}")]
    Read { key: String, reason: String },
    #[error("storage write failed for `{key}`: {reason}")]
    Write { key: String, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
