use thiserror::Error;

/// Errors from the versioned store, cache, and atomic publish protocol.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("atomic publish failed: {0}")]
    AtomicPublishFailed(String),

    #[error("permission error: {0}")]
    PermissionError(String),

    #[error("path not found: {0}")]
    PathNotFound(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}
