//! The owning-bot driver of a service tree.
//!
//! A [`ServiceHost`] pairs one bot with one [`RootScheduler`] and walks the
//! tree through its lifecycle: attach, install, dispatch events one at a
//! time, uninstall.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sprig_runtime::{ServiceHost, config::load_config};
//! use tokio::sync::mpsc;
//!
//! let config = load_config()?;
//! let mut host = ServiceHost::from_config(bot, &config)?;
//!
//! let (tx, rx) = mpsc::channel(64);
//! tokio::spawn(read_events_into(tx));
//!
//! // Installs, serves until the channel closes or Ctrl+C, then uninstalls.
//! host.run(rx).await?;
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use sprig_core::{BoxedBot, BoxedEvent, Event, RootScheduler, ServiceHandle, SharedService};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::SprigConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// Lifecycle state of a [`ServiceHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    /// Services may be attached; nothing is installed yet.
    Idle,
    /// The tree is installed and accepts events.
    Installed,
    /// The tree has been torn down. Terminal.
    Uninstalled,
}

impl fmt::Display for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Installed => "installed",
            Self::Uninstalled => "uninstalled",
        })
    }
}

/// Drives one service tree on behalf of one bot.
pub struct ServiceHost {
    bot: BoxedBot,
    scheduler: Arc<RootScheduler>,
    state: HostState,
}

impl ServiceHost {
    /// Creates a host with an empty root.
    pub fn new(bot: BoxedBot) -> Self {
        Self {
            bot,
            scheduler: RootScheduler::new_shared(),
            state: HostState::Idle,
        }
    }

    /// Creates a host and attaches every service listed in `services.root`.
    ///
    /// Also initializes logging from `config.logging` unless a subscriber is
    /// already installed.
    pub fn from_config(bot: BoxedBot, config: &SprigConfig) -> RuntimeResult<Self> {
        logging::init_from_config(&config.logging);

        let mut host = Self::new(bot);
        for name in &config.services.root {
            host.attach_by_name(name)?;
        }

        info!(
            bot = host.bot.id(),
            services = config.services.root.len(),
            log_level = %config.logging.level,
            "Host created from configuration"
        );
        Ok(host)
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    pub fn state(&self) -> HostState {
        self.state
    }

    /// Number of events dispatched so far.
    pub fn ticks(&self) -> u64 {
        self.scheduler.ticks()
    }

    pub fn scheduler(&self) -> &Arc<RootScheduler> {
        &self.scheduler
    }

    pub fn bot(&self) -> &BoxedBot {
        &self.bot
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────────

    /// Attaches a top-level service. Only allowed before install.
    pub fn attach(&mut self, service: SharedService) -> RuntimeResult<()> {
        self.expect_state("attach a service", HostState::Idle)?;
        let identity = service.identity();
        if self.scheduler.add(service).is_some() {
            warn!(
                service = identity,
                "Top-level service attached twice, keeping the newer one"
            );
        }
        Ok(())
    }

    /// Attaches a top-level service from the global registry. Only allowed
    /// before install.
    pub fn attach_by_name(&mut self, name: &str) -> RuntimeResult<()> {
        self.expect_state("attach a service", HostState::Idle)?;
        self.scheduler.require_by_name(name)?;
        Ok(())
    }

    /// Installs the whole tree.
    ///
    /// On a configuration failure the host stays idle. Every service the
    /// attempt loaded has been unloaded again, so `install` may be retried.
    pub fn install(&mut self) -> RuntimeResult<()> {
        self.expect_state("install", HostState::Idle)?;

        if let Err(e) = self.scheduler.install(&self.bot, None) {
            error!(bot = self.bot.id(), error = %e, "Service tree failed to install");
            return Err(e.into());
        }

        self.state = HostState::Installed;
        info!(
            bot = self.bot.id(),
            services = self.scheduler.children().len(),
            "Service tree installed"
        );
        Ok(())
    }

    /// Serves one event through the tree and returns its tick number.
    pub fn dispatch(&mut self, event: &mut dyn Event) -> RuntimeResult<u64> {
        self.expect_state("dispatch an event", HostState::Installed)?;
        self.scheduler.serve(&self.bot, event);
        Ok(self.scheduler.ticks())
    }

    /// Tears the tree down.
    pub fn uninstall(&mut self) -> RuntimeResult<()> {
        self.expect_state("uninstall", HostState::Installed)?;
        self.scheduler.uninstall(&self.bot);
        self.state = HostState::Uninstalled;
        info!(bot = self.bot.id(), ticks = self.ticks(), "Service tree uninstalled");
        Ok(())
    }

    fn expect_state(&self, operation: &'static str, expected: HostState) -> RuntimeResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(RuntimeError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    // ─── Event loop ──────────────────────────────────────────────────────────

    /// Installs, serves events until the channel closes or a shutdown signal
    /// arrives (Ctrl+C or SIGTERM), then uninstalls.
    pub async fn run(&mut self, events: mpsc::Receiver<BoxedEvent>) -> RuntimeResult<()> {
        info!("Sprig host is now running. Press Ctrl+C to stop.");
        self.run_until(events, wait_for_shutdown()).await
    }

    /// Like [`run`](Self::run) with a custom shutdown future.
    ///
    /// Events already queued when `shutdown` completes are dropped.
    pub async fn run_until<F>(
        &mut self,
        mut events: mpsc::Receiver<BoxedEvent>,
        shutdown: F,
    ) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        self.install()?;

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    debug!("Shutdown requested");
                    break;
                }
                received = events.recv() => match received {
                    Some(mut event) => {
                        self.dispatch(event.as_mut())?;
                    }
                    None => {
                        debug!("Event channel closed");
                        break;
                    }
                },
            }
        }

        self.uninstall()
    }
}

impl fmt::Debug for ServiceHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHost")
            .field("bot", &self.bot.id())
            .field("state", &self.state)
            .field("ticks", &self.ticks())
            .finish()
    }
}

/// Waits for shutdown signals (Ctrl+C or SIGTERM).
///
/// If no handler can be registered, never completes.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => {
                        info!("Received Ctrl+C, shutting down");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down");
                    }
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
