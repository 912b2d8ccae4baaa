//! Sprig Runtime - Hosting layer for Sprig service trees.
//!
//! This crate provides:
//! - The owning-bot driver (`ServiceHost`)
//! - Layered configuration loading (`ConfigLoader`, `SprigConfig`)
//! - Config-driven logging setup (`logging::init_from_config`)
//!
//! ```ignore
//! use sprig_runtime::{ServiceHost, config::load_config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let mut host = ServiceHost::from_config(my_bot(), &config)?;
//!
//!     let (tx, rx) = tokio::sync::mpsc::channel(64);
//!     spawn_protocol_reader(tx);
//!
//!     // Run until the reader hangs up or Ctrl+C
//!     host.run(rx).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod host;
pub mod logging;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, LoggingConfig, SprigConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use host::{HostState, ServiceHost};
pub use logging::init_from_config;

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
