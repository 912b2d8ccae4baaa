//! Error types for the service tree.
//!
//! Only configuration-class failures live here. A service's own success or
//! failure is never an error; it travels inside [`RunResult`](super::RunResult).

use std::any::TypeId;

use thiserror::Error;

/// Errors raised by the registry, the execution manager, and installs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// No factory is registered under this name.
    #[error("service '{name}' is not registered")]
    UnknownService {
        /// The name that was looked up.
        name: String,
    },

    /// The identity has no entry in the execution manager.
    #[error("service '{identity}' is not attached")]
    NotAttached {
        /// The identity that was addressed.
        identity: String,
    },

    /// A different implementation type already owns this registry name.
    #[error("service name '{name}' is already registered to a different type")]
    ConflictingRegistration {
        /// The contested name.
        name: String,
        /// Type that holds the name.
        existing: TypeId,
        /// Type that tried to take it.
        rejected: TypeId,
    },

    /// The process-wide registry was built before `set_global` was called.
    #[error("the global service registry is already initialized")]
    RegistryInitialized,
}

impl ServiceError {
    /// Creates an unknown service error.
    pub fn unknown_service(name: impl Into<String>) -> Self {
        Self::UnknownService { name: name.into() }
    }

    /// Creates a not attached error.
    pub fn not_attached(identity: impl Into<String>) -> Self {
        Self::NotAttached {
            identity: identity.into(),
        }
    }
}

/// Result type for service tree operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
