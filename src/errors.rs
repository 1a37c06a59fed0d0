use thiserror::Error;

/// Failure categories for storage operations.
///
/// Messages are surfaced verbatim to the caller; the category decides how
/// the UI layer reacts (re-prompt on collisions, plain error dialog
/// otherwise).
#[derive(Debug, Error)]
pub enum StorageError {
    /// A computed target path escapes the vault root.
    #[error("{0}")]
    PathViolation(String),
    /// A referenced note, folder or trash entry does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The destination name is already occupied.
    #[error("{0}")]
    NameCollision(String),
    /// Structural violations: touching the root folder, moving a folder
    /// into its own subtree.
    #[error("{0}")]
    InvalidOperation(String),
    /// Underlying filesystem failure, propagated without retry.
    #[error("{0}")]
    Io(String),
    /// Sidecar serialization failure.
    #[error("{0}")]
    Internal(String),
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
