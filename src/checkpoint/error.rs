//! Snapshot error types.

use thiserror::Error;

/// Errors raised while saving, loading or restoring a snapshot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckpointError {
    #[error("Snapshot serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Snapshot deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Written by a different snapshot format version.
    #[error("Unsupported snapshot version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Snapshot validation failed: {0}")]
    ValidationFailed(String),
}
