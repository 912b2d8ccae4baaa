//! # Sprig
//!
//! A composable service-tree runtime for event-driven bots.
//!
//! ## Overview
//!
//! A bot's behavior is split into services. Each service can own child
//! services, declare them by name, and cache what each child returned for the
//! latest event. One root scheduler ticks the whole tree once per event.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌───────────────┐     ┌────────────────────────────┐
//! │ ServiceHost │────▶│ RootScheduler │────▶│ Greeter ──▶ Counter, Echo  │
//! │   (bot)     │     │  (one tick)   │────▶│ Logger                     │
//! └─────────────┘     └───────────────┘     └────────────────────────────┘
//! ```
//!
//! - **Host**: owns the bot, installs the tree, feeds it events
//! - **Services**: implement `Service` hooks, wrapped by `ServiceComposite`
//! - **Registry**: builds services by name; filled by `#[register_service]`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sprig::prelude::*;
//!
//! #[derive(Default)]
//! struct Echo;
//!
//! #[register_service(alias = "echo")]
//! impl Service for Echo {
//!     fn run(
//!         &mut self,
//!         _bot: &BoxedBot,
//!         event: &mut dyn Event,
//!         _children: &mut ExecutionManager,
//!     ) -> RunResult {
//!         RunResult::new(1).with_payload(event.event_name())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = sprig::runtime::config::load_config()?;
//!     let mut host = ServiceHost::from_config(my_bot(), &config)?;
//!     let (tx, rx) = tokio::sync::mpsc::channel(64);
//!     spawn_protocol_reader(tx);
//!     host.run(rx).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: Load `sprig.toml` (default)
//! - `yaml-config`: Load `sprig.yaml`
//! - `json-log`: JSON log lines

pub use sprig_core as core;
pub use sprig_runtime as runtime;

pub use sprig_macros::register_service;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use sprig::prelude::*;
/// ```
pub mod prelude {
    // Host - main entry point
    pub use sprig_runtime::{HostState, ServiceHost, SprigConfig};

    // Service tree
    pub use sprig_core::prelude::*;

    // Registration
    pub use sprig_macros::register_service;
}
