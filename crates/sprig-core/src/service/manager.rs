//! Execution state of one composite's children.
//!
//! An [`ExecutionManager`] maps each attached child's identity to its handle
//! and the [`RunResult`] it produced last. Keys are kept in lexical order, so
//! every traversal (install, uninstall, tick) is deterministic regardless of
//! the order children were attached in.
//!
//! Identities are derived from the implementation type, which makes them
//! collide on purpose: attaching a second `X` where an `X` already lives
//! replaces the old entry outright, handle and cached result alike.

use std::collections::BTreeMap;
use std::fmt;
use std::mem;
use std::sync::Arc;

use tracing::{debug, trace};

use super::{Service, ServiceRegistry, SharedService, identity_of};
use crate::foundation::{BoxedBot, Event, RetCode, RunResult, ServiceError, ServiceResult};

// =============================================================================
// ExecutionEntry
// =============================================================================

/// One attached child: its handle and its last cached result.
///
/// The handle is fixed when the entry is created. The result is only ever
/// swapped for a whole new value.
pub struct ExecutionEntry {
    result: RunResult,
    service: SharedService,
}

impl ExecutionEntry {
    fn new(service: SharedService) -> Self {
        Self {
            result: RunResult::nothing(),
            service,
        }
    }

    /// The cached result.
    pub fn result(&self) -> &RunResult {
        &self.result
    }

    /// The child's handle.
    pub fn service(&self) -> &SharedService {
        &self.service
    }

    /// The child's identity.
    pub fn identity(&self) -> &'static str {
        self.service.identity()
    }

    /// Substitutes the cached result, returning the previous one.
    pub fn store(&mut self, result: RunResult) -> RunResult {
        mem::replace(&mut self.result, result)
    }
}

impl fmt::Debug for ExecutionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionEntry")
            .field("identity", &self.identity())
            .field("result", &self.result)
            .finish()
    }
}

// =============================================================================
// ExecutionManager
// =============================================================================

/// Ordered collection of a composite's children and their cached results.
#[derive(Default)]
pub struct ExecutionManager {
    entries: BTreeMap<&'static str, ExecutionEntry>,
}

impl ExecutionManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Attaching ───────────────────────────────────────────────────────────

    /// Instantiates the service registered under `name` in the global
    /// registry and attaches it.
    ///
    /// The entry is keyed by the new instance's identity, which differs from
    /// `name` when `name` is an alias.
    pub fn require_by_name(&mut self, name: &str) -> ServiceResult<&mut Self> {
        self.require_from(ServiceRegistry::global(), name)
    }

    /// Same as [`require_by_name`](Self::require_by_name) against an explicit
    /// registry.
    pub fn require_from(
        &mut self,
        registry: &ServiceRegistry,
        name: &str,
    ) -> ServiceResult<&mut Self> {
        let service = registry.create(name)?;
        debug!(requested = name, service = service.identity(), "Required service");
        self.add(service);
        Ok(self)
    }

    /// Requires `S` by its identity from the global registry.
    pub fn require<S: Service>(&mut self) -> ServiceResult<&mut Self> {
        self.require_by_name(identity_of::<S>())
    }

    /// Attaches an existing handle with a no-op cached result.
    ///
    /// An entry with the same identity is overwritten; its handle is
    /// returned.
    pub fn add(&mut self, service: SharedService) -> Option<SharedService> {
        let identity = service.identity();
        let displaced = self.entries.insert(identity, ExecutionEntry::new(service));
        if displaced.is_some() {
            debug!(service = identity, "Attached service replaced an existing entry");
        }
        displaced.map(|entry| entry.service)
    }

    // ─── Detaching ───────────────────────────────────────────────────────────

    /// Detaches the entry for `identity`. Returns whether one was present.
    pub fn remove(&mut self, identity: &str) -> bool {
        self.entries.remove(identity).is_some()
    }

    /// Detaches the entry for `S`.
    pub fn remove_service<S: Service>(&mut self) -> bool {
        self.remove(identity_of::<S>())
    }

    /// Detaches every entry.
    pub fn remove_all(&mut self) {
        self.entries.clear();
    }

    // ─── Cached results ──────────────────────────────────────────────────────

    /// Resets the cached result of every entry matching `cond` to the no-op
    /// value. Returns how many were reset.
    pub fn invalidate_where<F>(&mut self, mut cond: F) -> usize
    where
        F: FnMut(&ExecutionEntry) -> bool,
    {
        let mut count = 0;
        for entry in self.entries.values_mut() {
            if cond(entry) {
                entry.store(RunResult::nothing());
                count += 1;
            }
        }
        count
    }

    /// [`invalidate_where`](Self::invalidate_where) over the cached code.
    pub fn invalidate_where_code<F>(&mut self, mut cond: F) -> usize
    where
        F: FnMut(RetCode) -> bool,
    {
        self.invalidate_where(|entry| cond(entry.result.code()))
    }

    /// Resets the cached result of `identity`. Returns whether it was attached.
    pub fn invalidate(&mut self, identity: &str) -> bool {
        self.invalidate_where(|entry| entry.identity() == identity) > 0
    }

    /// Resets every cached result.
    pub fn invalidate_all(&mut self) -> usize {
        self.invalidate_where(|_| true)
    }

    /// Substitutes the cached result of `identity`, returning the previous one.
    ///
    /// Fails with [`ServiceError::NotAttached`] and inserts nothing when
    /// `identity` has no entry.
    pub fn replace(&mut self, identity: &str, newer: RunResult) -> ServiceResult<RunResult> {
        let entry = self
            .entries
            .get_mut(identity)
            .ok_or_else(|| ServiceError::not_attached(identity))?;
        Ok(entry.store(newer))
    }

    /// Serves the child `identity` once and caches what it computed.
    ///
    /// Returns the result cached *before* this call; the fresh one is visible
    /// through [`result`](Self::result) or on the next `serve`.
    pub fn serve(
        &mut self,
        identity: &str,
        bot: &BoxedBot,
        event: &mut dyn Event,
    ) -> ServiceResult<RunResult> {
        let service = self
            .entries
            .get(identity)
            .map(|entry| Arc::clone(&entry.service))
            .ok_or_else(|| ServiceError::not_attached(identity))?;

        let fresh = service.serve(bot, event);
        trace!(service = identity, code = fresh.code(), "Served child");
        self.replace(identity, fresh)
    }

    // ─── Traversal ───────────────────────────────────────────────────────────

    /// Visits every entry in ascending identity order.
    pub fn for_each<F>(&mut self, mut visit: F)
    where
        F: FnMut(&'static str, &mut ExecutionEntry),
    {
        for (identity, entry) in &mut self.entries {
            visit(*identity, entry);
        }
    }

    /// Read-only traversal in ascending identity order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ExecutionEntry)> {
        self.entries.iter().map(|(identity, entry)| (*identity, entry))
    }

    /// Attached identities in ascending order.
    pub fn identities(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    // ─── Lookup ──────────────────────────────────────────────────────────────

    /// The entry for `identity`, if attached.
    pub fn get(&self, identity: &str) -> Option<&ExecutionEntry> {
        self.entries.get(identity)
    }

    /// The cached result for `identity`, if attached.
    pub fn result(&self, identity: &str) -> Option<&RunResult> {
        self.get(identity).map(ExecutionEntry::result)
    }

    /// Returns `true` if `identity` is attached.
    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    /// Number of attached children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no child is attached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ExecutionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(id, entry)| (id, &entry.result)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{ServiceComposite, ServiceRegistration};
    use crate::test_support::{Alpha, Beta, Gamma, Probe, Quiet, TestEvent, mock_bot};

    fn probe(codes: &[RetCode]) -> SharedService {
        ServiceComposite::shared(Probe::with_codes(codes))
    }

    #[test]
    fn test_add_keys_by_identity() {
        let mut mgr = ExecutionManager::new();
        assert!(mgr.add(probe(&[])).is_none());

        assert_eq!(mgr.len(), 1);
        assert!(mgr.contains(identity_of::<Probe>()));
        assert!(mgr.result(identity_of::<Probe>()).unwrap().is_noop());
    }

    #[test]
    fn test_second_instance_of_same_type_overwrites() {
        let mut mgr = ExecutionManager::new();
        let first = probe(&[]);
        let second = probe(&[]);

        mgr.add(Arc::clone(&first));
        mgr.replace(identity_of::<Probe>(), RunResult::new(9)).unwrap();

        let displaced = mgr.add(Arc::clone(&second)).unwrap();
        assert!(Arc::ptr_eq(&displaced, &first));
        drop(displaced);

        assert_eq!(mgr.len(), 1);
        let entry = mgr.get(identity_of::<Probe>()).unwrap();
        assert!(Arc::ptr_eq(entry.service(), &second));
        assert!(entry.result().is_noop());
        // Only the test still holds the first handle.
        assert_eq!(Arc::strong_count(&first), 1);
        assert_eq!(Arc::strong_count(&second), 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut mgr = ExecutionManager::new();
        mgr.add(probe(&[]));

        assert!(mgr.remove(identity_of::<Probe>()));
        assert!(!mgr.remove(identity_of::<Probe>()));
        assert!(mgr.is_empty());
    }

    #[test]
    fn test_remove_service_and_remove_all() {
        let mut mgr = ExecutionManager::new();
        mgr.add(ServiceComposite::shared(Alpha::default()));
        mgr.add(ServiceComposite::shared(Beta::default()));

        assert!(mgr.remove_service::<Alpha>());
        assert!(!mgr.remove_service::<Alpha>());
        assert_eq!(mgr.identities(), vec![identity_of::<Beta>()]);

        mgr.remove_all();
        assert!(mgr.is_empty());
    }

    #[test]
    fn test_traversal_is_lexical_not_attach_order() {
        let mut mgr = ExecutionManager::new();
        mgr.add(ServiceComposite::shared(Beta::default()));
        mgr.add(ServiceComposite::shared(Alpha::default()));
        mgr.add(ServiceComposite::shared(Gamma::default()));

        let mut visited = Vec::new();
        mgr.for_each(|identity, _| visited.push(identity));

        assert_eq!(
            visited,
            vec![identity_of::<Alpha>(), identity_of::<Beta>(), identity_of::<Gamma>()]
        );
        assert_eq!(mgr.identities(), visited);
    }

    #[test]
    fn test_replace_returns_previous() {
        let mut mgr = ExecutionManager::new();
        mgr.add(probe(&[]));
        let id = identity_of::<Probe>();

        let old = mgr.replace(id, RunResult::new(3)).unwrap();
        assert!(old.is_noop());
        let old = mgr.replace(id, RunResult::new(-1)).unwrap();
        assert_eq!(old.code(), 3);
        assert_eq!(mgr.result(id).unwrap().code(), -1);
    }

    #[test]
    fn test_replace_on_unattached_inserts_nothing() {
        let mut mgr = ExecutionManager::new();
        let err = mgr.replace("ghost", RunResult::new(1)).unwrap_err();

        assert_eq!(err, ServiceError::not_attached("ghost"));
        assert!(mgr.is_empty());
        assert!(!mgr.contains("ghost"));
    }

    #[test]
    fn test_invalidate_where_resets_only_matches() {
        let mut mgr = ExecutionManager::new();
        mgr.add(ServiceComposite::shared(Alpha::default()));
        mgr.add(ServiceComposite::shared(Beta::default()));
        mgr.add(ServiceComposite::shared(Gamma::default()));
        mgr.replace(identity_of::<Alpha>(), RunResult::new(5)).unwrap();
        mgr.replace(identity_of::<Beta>(), RunResult::new(-4)).unwrap();
        mgr.replace(identity_of::<Gamma>(), RunResult::new(-7)).unwrap();

        let reset = mgr.invalidate_where_code(|code| code < 0);

        assert_eq!(reset, 2);
        assert_eq!(mgr.result(identity_of::<Alpha>()).unwrap().code(), 5);
        assert!(mgr.result(identity_of::<Beta>()).unwrap().is_noop());
        assert!(mgr.result(identity_of::<Gamma>()).unwrap().is_noop());
    }

    #[test]
    fn test_invalidate_single_and_all() {
        let mut mgr = ExecutionManager::new();
        mgr.add(ServiceComposite::shared(Alpha::default()));
        mgr.add(ServiceComposite::shared(Beta::default()));
        mgr.replace(identity_of::<Alpha>(), RunResult::new(1)).unwrap();
        mgr.replace(identity_of::<Beta>(), RunResult::new(2)).unwrap();

        assert!(mgr.invalidate(identity_of::<Alpha>()));
        assert!(!mgr.invalidate("ghost"));
        assert!(mgr.result(identity_of::<Alpha>()).unwrap().is_noop());
        assert_eq!(mgr.result(identity_of::<Beta>()).unwrap().code(), 2);

        assert_eq!(mgr.invalidate_all(), 2);
        assert!(mgr.iter().all(|(_, entry)| entry.result().is_noop()));
    }

    #[test]
    fn test_serve_returns_previously_cached_result() {
        let bot = mock_bot();
        let mut event = TestEvent::new("ping");
        let mut mgr = ExecutionManager::new();
        mgr.add(probe(&[5, -2]));
        let id = identity_of::<Probe>();

        let first = mgr.serve(id, &bot, &mut event).unwrap();
        assert!(first.is_noop());
        assert_eq!(mgr.result(id).unwrap().code(), 5);

        let second = mgr.serve(id, &bot, &mut event).unwrap();
        assert_eq!(second.code(), 5);
        assert!(second.is_success());
        assert_eq!(mgr.result(id).unwrap().code(), -2);
        assert!(mgr.result(id).unwrap().is_failed());
    }

    #[test]
    fn test_serve_unattached_is_an_error() {
        let bot = mock_bot();
        let mut event = TestEvent::new("ping");
        let mut mgr = ExecutionManager::new();

        let err = mgr.serve("ghost", &bot, &mut event).unwrap_err();
        assert_eq!(err, ServiceError::not_attached("ghost"));
    }

    #[test]
    fn test_require_by_alias_keys_by_identity() {
        let mut registry = ServiceRegistry::new();
        registry
            .add(ServiceRegistration::of::<Quiet>().with_alias("quiet"))
            .unwrap();

        let mut mgr = ExecutionManager::new();
        mgr.require_from(&registry, "quiet").unwrap();

        assert!(!mgr.contains("quiet"));
        assert!(mgr.contains(identity_of::<Quiet>()));
        assert!(mgr.result(identity_of::<Quiet>()).unwrap().is_noop());
    }

    #[test]
    fn test_require_unknown_name_fails() {
        let mut mgr = ExecutionManager::new();
        let err = mgr.require_by_name("nobody.home").err().unwrap();
        assert_eq!(err, ServiceError::unknown_service("nobody.home"));
        assert!(mgr.is_empty());
    }

    #[test]
    fn test_require_from_global_slice() {
        let mut mgr = ExecutionManager::new();
        mgr.require::<Quiet>().unwrap().require_by_name("test.quiet").unwrap();
        assert_eq!(mgr.len(), 1);
    }

    #[test]
    fn test_debug_lists_results() {
        let mut mgr = ExecutionManager::new();
        mgr.add(probe(&[]));
        let text = format!("{mgr:?}");
        assert!(text.contains(identity_of::<Probe>()));
    }
}
