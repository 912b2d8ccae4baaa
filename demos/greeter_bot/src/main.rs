//! Greeter Bot Example
//!
//! A console bot whose behavior is a three-node service tree. Each line typed
//! on stdin becomes one event, served by the tree in one tick.
//!
//! # Usage
//!
//! ```bash
//! cd demos/greeter_bot
//! cargo run --package greeter-bot
//! # or with an explicit file and profile
//! cargo run --package greeter-bot -- --config sprig.toml --profile production
//! ```

mod console;
mod services;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use sprig::prelude::*;
use sprig::runtime::ConfigLoader;
use tokio::sync::mpsc;
use tracing::info;

use crate::console::{ConsoleBot, read_stdin};

#[derive(Parser)]
#[command(about = "A console greeter bot built from a Sprig service tree")]
struct Args {
    /// Configuration file; searched for in the current directory if omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile (development, production, ...).
    #[arg(short, long)]
    profile: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new().with_current_dir();
    if let Some(path) = &args.config {
        loader = loader.file(path);
    }
    if let Some(profile) = args.profile {
        loader = loader.profile(profile);
    }
    let config = loader.load()?;

    let bot: BoxedBot = Arc::new(ConsoleBot::new("greeter"));
    let mut host = ServiceHost::from_config(bot, &config)?;

    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(read_stdin(tx));

    host.run(rx).await?;

    info!(ticks = host.ticks(), "Greeter bot stopped");
    Ok(())
}
