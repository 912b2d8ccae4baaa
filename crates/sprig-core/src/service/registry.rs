//! Name → factory registry.
//!
//! Services announce themselves through the [`SERVICE_REGISTRATIONS`]
//! distributed slice (usually via `#[register_service]`). Nothing is read
//! from that list until a registry is built, either explicitly with
//! [`ServiceRegistry::collect_all`] / [`ServiceRegistry::set_global`] or
//! lazily on the first call to [`ServiceRegistry::global`]. After that the
//! process-wide registry never changes.
//!
//! ```rust,ignore
//! // Explicit start-up ordering: build, extend, publish, then look up.
//! let mut registry = ServiceRegistry::collect_all();
//! registry.register("legacy.echo", ServiceRegistration::of::<Echo>())?;
//! ServiceRegistry::set_global(registry)?;
//!
//! let echo = ServiceRegistry::global().create("legacy.echo")?;
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::OnceLock;

use linkme::distributed_slice;
use tracing::{debug, trace, warn};

use super::{Service, ServiceComposite, SharedService, identity_of};
use crate::foundation::{ServiceError, ServiceResult};

// =============================================================================
// Registration entries
// =============================================================================

/// Function that builds a fresh service instance.
pub type ServiceFactory = fn() -> SharedService;

/// Link-time list of every service registration in the binary.
///
/// Each crate that defines services contributes entries here; the list is
/// only an input to [`ServiceRegistry::collect_all`].
#[distributed_slice]
pub static SERVICE_REGISTRATIONS: [ServiceRegistration];

/// A `Copy` description of how to build one implementation type.
///
/// Const-constructible so it can live in a `static`.
#[derive(Clone, Copy)]
pub struct ServiceRegistration {
    identity: fn() -> &'static str,
    type_id: fn() -> TypeId,
    factory: ServiceFactory,
    alias: Option<&'static str>,
}

impl ServiceRegistration {
    /// Registration for `S`, built with `S::default()`.
    pub const fn of<S: Service + Default>() -> Self {
        Self {
            identity: identity_of::<S>,
            type_id: TypeId::of::<S>,
            factory: create_default::<S>,
            alias: None,
        }
    }

    /// Adds a second lookup name next to the identity.
    pub const fn with_alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Identity of the registered implementation type.
    pub fn identity(&self) -> &'static str {
        (self.identity)()
    }

    /// Alias, if one was given.
    pub fn alias(&self) -> Option<&'static str> {
        self.alias
    }

    /// `TypeId` of the registered implementation type.
    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Builds a new instance.
    pub fn create(&self) -> SharedService {
        (self.factory)()
    }
}

impl fmt::Debug for ServiceRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistration")
            .field("identity", &self.identity())
            .field("alias", &self.alias)
            .finish()
    }
}

fn create_default<S: Service + Default>() -> SharedService {
    ServiceComposite::shared(S::default())
}

// =============================================================================
// ServiceRegistry
// =============================================================================

struct RegistryEntry {
    type_id: TypeId,
    factory: ServiceFactory,
}

static GLOBAL: OnceLock<ServiceRegistry> = OnceLock::new();

/// Append-only map from service name to factory.
#[derive(Default)]
pub struct ServiceRegistry {
    entries: HashMap<&'static str, RegistryEntry>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from every entry in [`SERVICE_REGISTRATIONS`].
    ///
    /// Conflicting entries are logged and the first one wins.
    pub fn collect_all() -> Self {
        Self::from_registrations(SERVICE_REGISTRATIONS.iter().copied())
    }

    /// Builds a registry from an explicit, ordered list of registrations.
    ///
    /// Conflicting entries are logged and the first one wins.
    pub fn from_registrations<I>(registrations: I) -> Self
    where
        I: IntoIterator<Item = ServiceRegistration>,
    {
        let mut registry = Self::new();
        for registration in registrations {
            if let Err(e) = registry.add(registration) {
                warn!(
                    service = registration.identity(),
                    error = %e,
                    "Conflicting service registration ignored, keeping first"
                );
            }
        }
        debug!(count = registry.len(), "Service registry built");
        registry
    }

    /// The process-wide registry.
    ///
    /// Built from [`collect_all`](Self::collect_all) on first use unless
    /// [`set_global`](Self::set_global) ran earlier.
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(Self::collect_all)
    }

    /// Publishes an explicitly built registry as the process-wide one.
    ///
    /// Fails with [`ServiceError::RegistryInitialized`] once the global
    /// registry exists.
    pub fn set_global(registry: Self) -> ServiceResult<()> {
        GLOBAL
            .set(registry)
            .map_err(|_| ServiceError::RegistryInitialized)
    }

    /// Registers `registration` under `name`.
    ///
    /// Registering the same type under the same name again is a no-op. A
    /// different type under a taken name is rejected.
    pub fn register(
        &mut self,
        name: &'static str,
        registration: ServiceRegistration,
    ) -> ServiceResult<()> {
        let type_id = registration.type_id();
        match self.entries.entry(name) {
            Entry::Occupied(existing) => {
                let existing = existing.get().type_id;
                if existing == type_id {
                    trace!(service = name, "Service already registered");
                    Ok(())
                } else {
                    Err(ServiceError::ConflictingRegistration {
                        name: name.to_string(),
                        existing,
                        rejected: type_id,
                    })
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(RegistryEntry {
                    type_id,
                    factory: registration.factory,
                });
                debug!(service = name, "Service registered");
                Ok(())
            }
        }
    }

    /// Registers `registration` under its identity and, if set, its alias.
    ///
    /// Both names are checked before either is inserted.
    pub fn add(&mut self, registration: ServiceRegistration) -> ServiceResult<()> {
        let names = std::iter::once(registration.identity()).chain(registration.alias());
        for name in names.clone() {
            self.check_free(name, registration.type_id())?;
        }
        for name in names {
            self.register(name, registration)?;
        }
        Ok(())
    }

    /// Registers `S` under its identity, built with `S::default()`.
    pub fn register_service<S: Service + Default>(&mut self) -> ServiceResult<()> {
        self.add(ServiceRegistration::of::<S>())
    }

    /// Builds a new instance of the service registered under `name`.
    pub fn create(&self, name: &str) -> ServiceResult<SharedService> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| ServiceError::unknown_service(name))?;
        Ok((entry.factory)())
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the number of registered names (aliases included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns all registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }

    fn check_free(&self, name: &'static str, type_id: TypeId) -> ServiceResult<()> {
        match self.entries.get(name) {
            Some(entry) if entry.type_id != type_id => Err(ServiceError::ConflictingRegistration {
                name: name.to_string(),
                existing: entry.type_id,
                rejected: type_id,
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("names", &self.names())
            .finish()
    }
}
