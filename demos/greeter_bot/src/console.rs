//! A bot that talks over stdin/stdout.

use std::any::Any;

use sprig::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub struct ConsoleBot {
    id: String,
}

impl ConsoleBot {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn say(&self, text: &str) {
        println!("[{}] {text}", self.id);
    }
}

impl Bot for ConsoleBot {
    fn id(&self) -> &str {
        &self.id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// One line typed on the console.
pub struct ChatLine {
    pub text: String,
}

impl Event for ChatLine {
    fn event_name(&self) -> &'static str {
        "chat_line"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Forwards stdin lines until EOF or the host stops listening.
pub async fn read_stdin(events: mpsc::Sender<BoxedEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(text)) => {
                if events.send(Box::new(ChatLine { text })).await.is_err() {
                    debug!("Host stopped listening");
                    break;
                }
            }
            Ok(None) => {
                debug!("Console closed");
                break;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read from stdin");
                break;
            }
        }
    }
}
