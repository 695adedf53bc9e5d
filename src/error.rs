//! Error taxonomy for the filesystem core.
//!
//! Domain errors are reported to the operator and never abort the session.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    /// Name collision on directory creation or rename.
    #[error("'{0}': file exists")]
    AlreadyExists(String),

    /// Referenced name has no match among the current directory's children.
    #[error("'{0}': no such file or directory")]
    NotFound(String),

    /// Delete attempted on a directory that still has children.
    #[error("'{0}': directory not empty")]
    NotEmpty(String),

    /// chmod mode string of disallowed length; must be 9 or 3 characters.
    #[error("invalid permission format '{0}'")]
    InvalidFormat(String),

    /// Snapshot target could not be opened or written. The in-memory
    /// session continues; the flush is skipped.
    #[error("snapshot unavailable: {0}")]
    Persistence(#[from] std::io::Error),

    /// Snapshot file exists but cannot be decoded.
    #[error("snapshot corrupt: {0}")]
    Snapshot(String),

    /// Configuration or logging setup failure.
    #[error("configuration error: {0}")]
    Config(String),
}
