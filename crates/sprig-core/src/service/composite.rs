//! Shared lifecycle wiring for every service implementation.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, error, trace, warn};

use super::{ExecutionManager, Service, ServiceHandle, SharedService, identity_of};
use crate::foundation::{BoxedBot, Event, RunResult, ServiceResult};

/// Wraps a [`Service`] and owns its children.
///
/// Locks are always taken inner first, then children.
pub struct ServiceComposite<S> {
    inner: Mutex<S>,
    children: Mutex<ExecutionManager>,
}

impl<S: Service> ServiceComposite<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner: Mutex::new(inner),
            children: Mutex::new(ExecutionManager::new()),
        }
    }

    /// Wraps `inner` and erases it into a [`SharedService`].
    pub fn shared(inner: S) -> SharedService {
        Arc::new(Self::new(inner))
    }

    /// Locks and returns this node's children.
    pub fn children(&self) -> MutexGuard<'_, ExecutionManager> {
        self.children.lock()
    }

    /// Runs `f` with exclusive access to the wrapped service.
    pub fn with_inner<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<S: Service> ServiceHandle for ServiceComposite<S> {
    fn identity(&self) -> &'static str {
        identity_of::<S>()
    }

    /// Configures, installs children in identity order, then loads.
    ///
    /// If a child fails, the children installed before it are uninstalled in
    /// reverse order and this service is not loaded.
    fn install(&self, bot: &BoxedBot, parent: Option<&ExecutionManager>) -> ServiceResult<()> {
        let identity = self.identity();
        let mut inner = self.inner.lock();
        let mut children = self.children.lock();

        if let Err(e) = inner.configure_children(parent, &mut children) {
            error!(service = identity, error = %e, "Failed to configure children");
            return Err(e);
        }

        let siblings: &ExecutionManager = &children;
        debug!(service = identity, children = siblings.len(), "Installing service");
        let mut installed: Vec<&SharedService> = Vec::with_capacity(siblings.len());
        for (child, entry) in siblings.iter() {
            if let Err(e) = entry.service().install(bot, Some(siblings)) {
                warn!(
                    service = identity,
                    child,
                    rolled_back = installed.len(),
                    "Child failed to install, unloading its installed siblings"
                );
                for done in installed.iter().rev() {
                    done.uninstall(bot);
                }
                return Err(e);
            }
            installed.push(entry.service());
        }

        inner.load(bot);
        debug!(service = identity, "Service loaded");
        Ok(())
    }

    fn uninstall(&self, bot: &BoxedBot) {
        let mut inner = self.inner.lock();
        let children = self.children.lock();

        for (_, entry) in children.iter() {
            entry.service().uninstall(bot);
        }

        inner.unload(bot);
        debug!(service = self.identity(), "Service unloaded");
    }

    fn serve(&self, bot: &BoxedBot, event: &mut dyn Event) -> RunResult {
        let mut inner = self.inner.lock();
        let mut children = self.children.lock();
        let result = inner.run(bot, event, &mut children);
        trace!(service = self.identity(), code = result.code(), "Service ran");
        result
    }
}

impl<S: Service> fmt::Debug for ServiceComposite<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceComposite")
            .field("identity", &identity_of::<S>())
            .finish_non_exhaustive()
    }
}
