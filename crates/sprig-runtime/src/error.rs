//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;
use crate::host::HostState;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The service tree could not be configured.
    #[error("Service error: {0}")]
    Service(#[from] sprig_core::ServiceError),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A host operation was called in the wrong lifecycle state.
    #[error("Cannot {operation} while the host is {state}")]
    InvalidState {
        operation: &'static str,
        state: HostState,
    },
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
