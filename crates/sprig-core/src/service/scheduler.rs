//! The root of a service tree.
//!
//! The root has no parent and no result of its own. On every event it serves
//! each top-level child once, in ascending identity order, and caches what
//! each child computed on that tick.

use std::sync::Arc;

use tracing::debug_span;

use super::{ExecutionManager, Service, ServiceComposite, SharedService};
use crate::foundation::{BoxedBot, Event, RunResult, ServiceResult};

/// Hooks of the root node.
#[derive(Debug, Default)]
pub struct Scheduler {
    ticks: u64,
}

impl Scheduler {
    /// Number of events dispatched so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Service for Scheduler {
    fn run(
        &mut self,
        bot: &BoxedBot,
        event: &mut dyn Event,
        children: &mut ExecutionManager,
    ) -> RunResult {
        self.ticks += 1;
        let span = debug_span!("tick", n = self.ticks, event = event.event_name());
        let _guard = span.enter();

        children.for_each(|_, entry| {
            let fresh = entry.service().serve(bot, &mut *event);
            entry.store(fresh);
        });
        RunResult::nothing()
    }
}

/// A composite driving [`Scheduler`]; owns the top-level services.
pub type RootScheduler = ServiceComposite<Scheduler>;

impl ServiceComposite<Scheduler> {
    /// Creates an empty root ready to be shared with a host.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new(Scheduler::default()))
    }

    /// Attaches a top-level service.
    pub fn add(&self, service: SharedService) -> Option<SharedService> {
        self.children().add(service)
    }

    /// Attaches a top-level service from the global registry.
    pub fn require_by_name(&self, name: &str) -> ServiceResult<()> {
        self.children().require_by_name(name).map(|_| ())
    }

    pub fn ticks(&self) -> u64 {
        self.with_inner(|scheduler| scheduler.ticks())
    }
}
