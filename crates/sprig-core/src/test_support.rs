//! Mock bot, event, and journaling services shared by unit tests.

use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::foundation::{Bot, BoxedBot, Event, RetCode, RunResult, ServiceResult};
use crate::service::{ExecutionManager, Service, SharedService};

pub(crate) struct MockBot;

impl Bot for MockBot {
    fn id(&self) -> &str {
        "mock"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) fn mock_bot() -> BoxedBot {
    Arc::new(MockBot)
}

pub(crate) struct TestEvent {
    pub(crate) text: String,
    /// Names of the services that ran, in order.
    pub(crate) trail: Vec<&'static str>,
}

impl TestEvent {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            trail: Vec::new(),
        }
    }
}

impl Event for TestEvent {
    fn event_name(&self) -> &'static str {
        "test"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub(crate) type Journal = Arc<Mutex<Vec<String>>>;

pub(crate) fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub(crate) fn read(journal: &Journal) -> Vec<String> {
    journal.lock().clone()
}

/// Service with no behavior at all.
#[derive(Default)]
pub(crate) struct Quiet;

impl Service for Quiet {}

/// Declares a service type that writes `Name:hook` lines to a journal,
/// attaches preset children, and returns queued codes from `run`.
macro_rules! journaling_service {
    ($($name:ident),+ $(,)?) => {$(
        #[derive(Default)]
        pub(crate) struct $name {
            journal: Option<Journal>,
            children: Vec<SharedService>,
            codes: VecDeque<RetCode>,
        }

        #[allow(dead_code)]
        impl $name {
            pub(crate) fn recording(journal: &Journal) -> Self {
                Self {
                    journal: Some(Arc::clone(journal)),
                    ..Self::default()
                }
            }

            pub(crate) fn with_codes(codes: &[RetCode]) -> Self {
                Self {
                    codes: codes.iter().copied().collect(),
                    ..Self::default()
                }
            }

            pub(crate) fn children(mut self, children: Vec<SharedService>) -> Self {
                self.children = children;
                self
            }

            pub(crate) fn codes(mut self, codes: &[RetCode]) -> Self {
                self.codes = codes.iter().copied().collect();
                self
            }

            fn note(&self, what: impl std::fmt::Display) {
                if let Some(journal) = &self.journal {
                    journal.lock().push(format!("{}:{}", stringify!($name), what));
                }
            }
        }

        impl Service for $name {
            fn configure_children(
                &mut self,
                parent: Option<&ExecutionManager>,
                children: &mut ExecutionManager,
            ) -> ServiceResult<()> {
                match parent {
                    Some(parent) => self.note(format_args!("configure<{}>", parent.len())),
                    None => self.note("configure"),
                }
                for child in &self.children {
                    children.add(Arc::clone(child));
                }
                Ok(())
            }

            fn load(&mut self, _bot: &BoxedBot) {
                self.note("load");
            }

            fn unload(&mut self, _bot: &BoxedBot) {
                self.note("unload");
            }

            fn run(
                &mut self,
                _bot: &BoxedBot,
                event: &mut dyn Event,
                _children: &mut ExecutionManager,
            ) -> RunResult {
                self.note("run");
                if let Some(event) = event.downcast_mut::<TestEvent>() {
                    event.trail.push(stringify!($name));
                }
                RunResult::new(self.codes.pop_front().unwrap_or_default())
            }
        }
    )+};
}

journaling_service!(Alpha, Beta, Gamma, Parent, Probe);

/// Service whose subtree cannot be configured.
#[derive(Default)]
pub(crate) struct Broken {
    journal: Option<Journal>,
}

impl Broken {
    pub(crate) fn recording(journal: &Journal) -> Self {
        Self {
            journal: Some(Arc::clone(journal)),
        }
    }
}

impl Service for Broken {
    fn configure_children(
        &mut self,
        _parent: Option<&ExecutionManager>,
        children: &mut ExecutionManager,
    ) -> ServiceResult<()> {
        children.require_by_name("nobody.home")?;
        Ok(())
    }

    fn load(&mut self, _bot: &BoxedBot) {
        if let Some(journal) = &self.journal {
            journal.lock().push("Broken:load".to_string());
        }
    }
}
