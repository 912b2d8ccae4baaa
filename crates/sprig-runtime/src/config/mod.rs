//! Configuration module for the Sprig runtime.
//!
//! Layered loading with figment, plus validation of the service list and
//! logging settings.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config};
pub use schema::{
    LogFormat, LogLevel, LogOutput, LoggingConfig, ServicesConfig, SpanEventConfig, SprigConfig,
};
pub use validation::validate_config;
