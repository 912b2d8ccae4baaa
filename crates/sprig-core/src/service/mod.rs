//! Service tree - registry, execution state, and lifecycle wiring.
//!
//! # Architecture
//!
//! Every node of the tree is a [`SharedService`]: an `Arc<dyn ServiceHandle>`.
//! Authors never implement [`ServiceHandle`] by hand. They implement the four
//! hooks of [`Service`] and wrap the value in a [`ServiceComposite`], which
//! supplies the shared install / uninstall / serve wiring once for every
//! implementation:
//!
//! ```text
//! RootScheduler
//! ├── a::Greeter          install: configure → children → load
//! │   ├── a::Counter      uninstall: children → unload
//! │   └── a::Echo         serve: run
//! └── b::Logger
//! ```
//!
//! Children are kept in an [`ExecutionManager`] keyed by identity and always
//! visited in ascending identity order, whatever order they were attached in.
//!
//! # Writing a service
//!
//! ```rust,ignore
//! use sprig::prelude::*;
//!
//! #[derive(Default)]
//! struct Greeter;
//!
//! #[register_service(alias = "greeter")]
//! impl Service for Greeter {
//!     fn configure_children(
//!         &mut self,
//!         _parent: Option<&ExecutionManager>,
//!         children: &mut ExecutionManager,
//!     ) -> ServiceResult<()> {
//!         children.require::<Counter>()?;
//!         Ok(())
//!     }
//!
//!     fn run(
//!         &mut self,
//!         bot: &BoxedBot,
//!         event: &mut dyn Event,
//!         children: &mut ExecutionManager,
//!     ) -> RunResult {
//!         let previous = children.serve(identity_of::<Counter>(), bot, event);
//!         RunResult::new(1)
//!     }
//! }
//! ```

pub mod composite;
pub mod manager;
pub mod registry;
pub mod scheduler;

use std::sync::Arc;

use crate::foundation::{BoxedBot, Event, RunResult, ServiceResult};

pub use composite::ServiceComposite;
pub use manager::{ExecutionEntry, ExecutionManager};
pub use registry::{SERVICE_REGISTRATIONS, ServiceFactory, ServiceRegistration, ServiceRegistry};
pub use scheduler::{RootScheduler, Scheduler};

/// Stable name of an implementation type.
///
/// Derived from the type alone, so every instance of `S` shares it and it
/// never changes while the process runs.
pub fn identity_of<S: ?Sized + 'static>() -> &'static str {
    std::any::type_name::<S>()
}

// ─── ServiceHandle ────────────────────────────────────────────────────────────

/// The capability set every node in a service tree exposes.
///
/// Implemented by [`ServiceComposite`]; held as [`SharedService`].
pub trait ServiceHandle: Send + Sync + 'static {
    /// Stable name of the implementation type behind this handle.
    fn identity(&self) -> &'static str;

    /// Declares the subtree, installs it, then loads this service.
    ///
    /// `parent` is the manager this service is attached to, or `None` at the
    /// root. Only configuration-class failures are returned.
    fn install(&self, bot: &BoxedBot, parent: Option<&ExecutionManager>) -> ServiceResult<()>;

    /// Uninstalls the subtree, then unloads this service.
    fn uninstall(&self, bot: &BoxedBot);

    /// Handles one event and returns the freshly computed result.
    fn serve(&self, bot: &BoxedBot, event: &mut dyn Event) -> RunResult;
}

/// A reference-counted service handle.
pub type SharedService = Arc<dyn ServiceHandle>;

// ─── Service ──────────────────────────────────────────────────────────────────

/// Lifecycle hooks supplied by a concrete service.
///
/// Every hook has an empty default. Hooks run while the owning composite holds
/// its locks, so a hook must not call back into its own handle.
pub trait Service: Send + 'static {
    /// The single place to populate `children` (via
    /// [`ExecutionManager::require_by_name`] or [`ExecutionManager::add`]).
    ///
    /// Runs at the start of every install, before any child is installed.
    fn configure_children(
        &mut self,
        _parent: Option<&ExecutionManager>,
        _children: &mut ExecutionManager,
    ) -> ServiceResult<()> {
        Ok(())
    }

    /// Runs after every child has been installed.
    fn load(&mut self, _bot: &BoxedBot) {}

    /// Runs after every child has been uninstalled.
    fn unload(&mut self, _bot: &BoxedBot) {}

    /// Handles one event.
    ///
    /// Failures are reported through the returned [`RunResult`], never by
    /// panicking.
    fn run(
        &mut self,
        _bot: &BoxedBot,
        _event: &mut dyn Event,
        _children: &mut ExecutionManager,
    ) -> RunResult {
        RunResult::nothing()
    }
}
