//! Error types for the All Seeing Eye core.

use thiserror::Error;

/// Core error type for shared operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Other(String),
}

/// Errors talking to a single node.
///
/// These never escape a discovery pass; the component making the call
/// absorbs them and drops the address.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Node {ip} is unreachable: {message}")]
    Unreachable { ip: String, message: String },

    #[error("Invalid response from {ip}: {message}")]
    InvalidResponse { ip: String, message: String },
}

impl DeviceError {
    pub fn ip(&self) -> &str {
        match self {
            DeviceError::Unreachable { ip, .. } | DeviceError::InvalidResponse { ip, .. } => ip,
        }
    }
}

/// Host registry errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Host '{query}' not found in {registry}. Use IP address, hostname, or description.")]
    NotFound { query: String, registry: String },

    #[error("No known hosts available in {0}")]
    Empty(String),

    #[error("Registry file is corrupt: {0}")]
    Corrupt(String),

    #[error("Failed to back up corrupt registry: {0}")]
    BackupFailed(String),

    #[error("Failed to access storage directory: {0}")]
    DirectoryAccess(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl StorageError {
    /// True for the resolve failures a caller can act on.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. } | StorageError::Empty(_))
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
