//! Error types for the All Seeing Eye CLI.
//!
//! CliError wraps CoreError from the shared library and adds CLI-specific variants.

use ase_link_core::error::CoreError;
use thiserror::Error;

// Re-export core error types so command modules can use them via crate::error
pub use ase_link_core::error::{DeviceError, StorageError};

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NETWORK_ERROR: i32 = 2;
    pub const NOT_FOUND: i32 = 3;
    pub const INVALID_ARGS: i32 = 4;
}

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No hosts found")]
    NoHostsFound,

    #[error("Request to {address} failed with status {status_code}")]
    RequestFailed { address: String, status_code: u16 },

    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(e) => match e {
                CoreError::Storage(se) if se.is_not_found() => exit_codes::NOT_FOUND,
                CoreError::Storage(_) => exit_codes::GENERAL_ERROR,
                CoreError::Device(_) => exit_codes::NETWORK_ERROR,
                CoreError::Other(_) => exit_codes::GENERAL_ERROR,
            },
            CliError::InvalidArgument(_) => exit_codes::INVALID_ARGS,
            CliError::NoHostsFound => exit_codes::NOT_FOUND,
            CliError::RequestFailed { status_code: 0, .. } => exit_codes::NETWORK_ERROR,
            CliError::RequestFailed { .. } => exit_codes::GENERAL_ERROR,
            CliError::Other(_) => exit_codes::GENERAL_ERROR,
        }
    }
}

// Conversions from core error subtypes to CliError
impl From<DeviceError> for CliError {
    fn from(e: DeviceError) -> Self {
        CliError::Core(CoreError::Device(e))
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        CliError::Core(CoreError::Storage(e))
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
