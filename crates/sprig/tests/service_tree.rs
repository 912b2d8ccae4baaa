use std::any::Any;
use std::sync::Arc;

use sprig::core::ServiceRegistry;
use sprig::prelude::*;
use sprig::runtime::RuntimeError;

struct TestBot;

impl Bot for TestBot {
    fn id(&self) -> &str {
        "integration"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Chat {
    text: String,
    replies: Vec<String>,
}

impl Chat {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            replies: Vec::new(),
        }
    }
}

impl Event for Chat {
    fn event_name(&self) -> &'static str {
        "chat"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct Tick;

impl Event for Tick {
    fn event_name(&self) -> &'static str {
        "tick"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Default)]
struct Counter {
    seen: i32,
}

#[register_service(alias = "it.counter")]
impl Service for Counter {
    fn run(
        &mut self,
        _bot: &BoxedBot,
        _event: &mut dyn Event,
        _children: &mut ExecutionManager,
    ) -> RunResult {
        self.seen += 1;
        RunResult::new(self.seen)
    }
}

#[derive(Default)]
struct Echo;

#[register_service(alias = "it.echo")]
impl Service for Echo {
    fn run(
        &mut self,
        _bot: &BoxedBot,
        event: &mut dyn Event,
        _children: &mut ExecutionManager,
    ) -> RunResult {
        match event.downcast_mut::<Chat>() {
            Some(chat) => {
                chat.replies.push(chat.text.clone());
                RunResult::new(1).with_payload(chat.text.len())
            }
            None => RunResult::new(-1),
        }
    }
}

#[derive(Default)]
struct Greeter;

#[register_service(alias = "it.greeter")]
impl Service for Greeter {
    fn configure_children(
        &mut self,
        _parent: Option<&ExecutionManager>,
        children: &mut ExecutionManager,
    ) -> ServiceResult<()> {
        children.require::<Counter>()?.require_by_name("it.echo")?;
        Ok(())
    }

    fn run(
        &mut self,
        bot: &BoxedBot,
        event: &mut dyn Event,
        children: &mut ExecutionManager,
    ) -> RunResult {
        let previous = children
            .serve(identity_of::<Counter>(), bot, event)
            .unwrap_or_default();
        children
            .serve(identity_of::<Echo>(), bot, event)
            .expect("echo is attached during configure_children");

        if let Some(chat) = event.downcast_mut::<Chat>() {
            chat.replies.push(format!("hello #{}", previous.code()));
        }
        RunResult::new(1)
    }
}

#[derive(Default)]
struct Plain;

#[register_service]
impl Service for Plain {}

mod left {
    #[derive(Default)]
    pub struct Twin;
}

mod right {
    #[derive(Default)]
    pub struct Twin;
}

#[register_service(alias = "it.left")]
impl Service for left::Twin {}

#[register_service(alias = "it.right")]
impl Service for right::Twin {}

fn host() -> ServiceHost {
    ServiceHost::new(Arc::new(TestBot))
}

#[test]
fn macro_registrations_reach_the_global_registry() {
    let registry = ServiceRegistry::global();

    for name in ["it.counter", "it.echo", "it.greeter"] {
        assert!(registry.contains(name), "missing alias {name}");
    }
    assert!(registry.contains(identity_of::<Greeter>()));
    assert!(registry.contains(identity_of::<Plain>()));

    let echo = registry.create("it.echo").unwrap();
    assert_eq!(echo.identity(), identity_of::<Echo>());
}

#[test]
fn same_named_types_register_side_by_side() {
    let registry = ServiceRegistry::global();

    let left = registry.create("it.left").unwrap();
    let right = registry.create("it.right").unwrap();
    assert_eq!(left.identity(), identity_of::<left::Twin>());
    assert_eq!(right.identity(), identity_of::<right::Twin>());
    assert_ne!(left.identity(), right.identity());
}

#[test]
fn greeter_sees_the_counter_one_tick_late() {
    let mut host = host();
    host.attach_by_name("it.greeter").unwrap();
    host.install().unwrap();

    let mut first = Chat::new("hi");
    host.dispatch(&mut first).unwrap();
    assert_eq!(first.replies, vec!["hi", "hello #0"]);

    let mut second = Chat::new("again");
    assert_eq!(host.dispatch(&mut second).unwrap(), 2);
    assert_eq!(second.replies, vec!["again", "hello #1"]);

    let cached = host
        .scheduler()
        .children()
        .result(identity_of::<Greeter>())
        .map(RunResult::code);
    assert_eq!(cached, Some(1));

    host.uninstall().unwrap();
}

#[test]
fn root_caches_payloads_of_top_level_services() {
    let mut host = host();
    host.attach_by_name("it.echo").unwrap();
    host.attach_by_name(identity_of::<Plain>()).unwrap();
    host.install().unwrap();

    host.dispatch(&mut Chat::new("four")).unwrap();
    {
        let children = host.scheduler().children();
        let echo = children.result(identity_of::<Echo>()).unwrap();
        assert!(echo.is_success());
        assert_eq!(echo.extract::<usize>(), Some(4));
        assert!(children.result(identity_of::<Plain>()).unwrap().is_noop());
    }

    host.dispatch(&mut Tick).unwrap();
    let children = host.scheduler().children();
    let echo = children.result(identity_of::<Echo>()).unwrap();
    assert!(echo.is_failed());
    assert!(!echo.has_payload());
}

#[test]
fn unknown_root_service_is_reported() {
    let mut config = SprigConfig::default();
    config.services.root = vec!["it.greeter".into(), "it.nowhere".into()];

    let err = ServiceHost::from_config(Arc::new(TestBot), &config).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Service(ServiceError::UnknownService { ref name }) if name == "it.nowhere"
    ));
}

#[tokio::test]
async fn host_runs_until_the_event_channel_closes() {
    let mut host = host();
    host.attach_by_name("it.counter").unwrap();

    let (tx, rx) = tokio::sync::mpsc::channel::<BoxedEvent>(4);
    tokio::spawn(async move {
        for _ in 0..3 {
            if tx.send(Box::new(Tick)).await.is_err() {
                break;
            }
        }
    });

    host.run_until(rx, std::future::pending()).await.unwrap();

    assert_eq!(host.ticks(), 3);
    assert_eq!(host.state(), HostState::Uninstalled);
    let cached = host
        .scheduler()
        .children()
        .result(identity_of::<Counter>())
        .map(RunResult::code);
    assert_eq!(cached, Some(3));
}
