//! # Sprig Core
//!
//! The service-tree engine of the Sprig bot runtime.
//!
//! A bot's behavior is a tree of services. Each service declares its children,
//! is installed depth-first, handles events, and is torn down in the same
//! order it was installed.
//!
//! ## Layers
//!
//! ### Foundation
//!
//! Value types shared by every service:
//! - **Results**: [`RunResult`] carries a signed code and an optional typed payload
//! - **Events**: type-erased events with downcasting ([`Event`], [`BoxedEvent`])
//! - **Bots**: the opaque session handle passed to every hook ([`Bot`], [`BoxedBot`])
//! - **Errors**: configuration-class failures ([`ServiceError`])
//!
//! ### Service Tree
//!
//! - **Hooks**: what an implementation supplies ([`Service`])
//! - **Composite**: the shared lifecycle wiring ([`ServiceComposite`])
//! - **Execution state**: a composite's children and their cached results ([`ExecutionManager`])
//! - **Registry**: name → factory lookup, populated at link time ([`ServiceRegistry`])
//! - **Root**: the tree's parentless top node ([`RootScheduler`])
//!
//! ```text
//! ┌──────────┐ event ┌───────────────┐ serve ┌─────────┐ serve ┌─────────┐
//! │   Host   │──────▶│ RootScheduler │──────▶│ Service │──────▶│  Child  │
//! └──────────┘       └───────────────┘       └─────────┘       └─────────┘
//! ```

pub mod foundation;
pub mod service;

#[cfg(test)]
mod test_support;

pub use foundation::{
    Bot, BoxedBot, BoxedEvent, Event, NO_SIGNIFICANT_RET, Outcome, RetCode, RunResult,
    ServiceError, ServiceResult,
};
pub use service::{
    ExecutionEntry, ExecutionManager, RootScheduler, SERVICE_REGISTRATIONS, Scheduler, Service,
    ServiceComposite, ServiceFactory, ServiceHandle, ServiceRegistration, ServiceRegistry,
    SharedService, identity_of,
};

// Re-export linkme so generated registrations resolve without a direct dependency.
pub use linkme;

/// Prelude for common imports.
pub mod prelude {
    pub use super::foundation::*;
    pub use super::service::{
        ExecutionManager, RootScheduler, Service, ServiceComposite, ServiceHandle,
        ServiceRegistration, ServiceRegistry, SharedService, identity_of,
    };
}
