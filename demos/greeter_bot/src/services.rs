//! The greeter tree.
//!
//! ```text
//! greeter
//! ├── counter   counts chat lines
//! └── echo      repeats `/echo ...`
//! ```

use sprig::prelude::*;
use tracing::{debug, warn};

use crate::console::{ChatLine, ConsoleBot};

fn say(bot: &BoxedBot, text: &str) {
    if let Some(console) = bot.downcast_ref::<ConsoleBot>() {
        console.say(text);
    }
}

#[derive(Default)]
pub struct Counter {
    lines: u64,
}

#[register_service(alias = "counter")]
impl Service for Counter {
    fn run(
        &mut self,
        _bot: &BoxedBot,
        event: &mut dyn Event,
        _children: &mut ExecutionManager,
    ) -> RunResult {
        if !event.is::<ChatLine>() {
            return RunResult::nothing();
        }
        self.lines += 1;
        RunResult::new(1).with_payload(self.lines)
    }
}

#[derive(Default)]
pub struct Echo;

#[register_service(alias = "echo")]
impl Service for Echo {
    fn run(
        &mut self,
        bot: &BoxedBot,
        event: &mut dyn Event,
        _children: &mut ExecutionManager,
    ) -> RunResult {
        let Some(line) = event.downcast_ref::<ChatLine>() else {
            return RunResult::nothing();
        };
        match line.text.strip_prefix("/echo ") {
            Some(rest) if !rest.trim().is_empty() => {
                say(bot, rest);
                RunResult::new(1)
            }
            Some(_) => RunResult::new(-1).with_payload("nothing to echo"),
            None => RunResult::nothing(),
        }
    }
}

#[derive(Default)]
pub struct Greeter;

#[register_service(alias = "greeter")]
impl Service for Greeter {
    fn configure_children(
        &mut self,
        _parent: Option<&ExecutionManager>,
        children: &mut ExecutionManager,
    ) -> ServiceResult<()> {
        children.require::<Counter>()?.require_by_name("echo")?;
        Ok(())
    }

    fn load(&mut self, bot: &BoxedBot) {
        say(bot, "Greeter ready. Say hi, or try `/echo something`.");
    }

    fn unload(&mut self, bot: &BoxedBot) {
        say(bot, "Goodbye!");
    }

    fn run(
        &mut self,
        bot: &BoxedBot,
        event: &mut dyn Event,
        children: &mut ExecutionManager,
    ) -> RunResult {
        // The counter hands back what it had before this line.
        let before = children
            .serve(identity_of::<Counter>(), bot, event)
            .map(|r| r.extract::<u64>().unwrap_or(0))
            .unwrap_or(0);

        if let Err(e) = children.serve(identity_of::<Echo>(), bot, event) {
            warn!(error = %e, "Echo could not be served");
        }
        if let Some(echo) = children.result(identity_of::<Echo>())
            && echo.is_failed()
        {
            debug!(reason = ?echo.downcast_ref::<&'static str>(), "Echo rejected the line");
            say(bot, "Usage: /echo <text>");
        }

        let Some(line) = event.downcast_ref::<ChatLine>() else {
            return RunResult::nothing();
        };
        let greeting = line.text.trim().to_lowercase();
        if greeting == "hi" || greeting == "hello" {
            say(bot, &format!("Hello! I had seen {before} lines before this one."));
            RunResult::new(1)
        } else {
            RunResult::nothing()
        }
    }
}
