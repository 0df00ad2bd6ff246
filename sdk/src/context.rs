//! Managed context contracts
//!
//! A managed context is a started runtime environment that owns a set of
//! services. Entry points create contexts; the engine's bootstrap adapter
//! owns each context for the duration of one run and closes it afterward.
//! Services are looked up by type through the context's [`ServiceRegistry`].

use crate::errors::ContextError;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Settings applied when an entry point starts a context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSettings {
    /// Do not bring up any network-facing environment
    pub headless: bool,

    /// Activation profiles, in the order they were requested
    pub profiles: Vec<String>,
}

impl ContextSettings {
    /// Headless settings with a single active profile
    pub fn headless(profile: impl Into<String>) -> Self {
        Self {
            headless: true,
            profiles: vec![profile.into()],
        }
    }

    /// Add another active profile
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profiles.push(profile.into());
        self
    }

    /// Check whether `profile` is active
    pub fn is_profile_active(&self, profile: &str) -> bool {
        self.profiles.iter().any(|p| p == profile)
    }

    /// Check whether something restricted to `required` profiles is enabled.
    ///
    /// An empty restriction list is always enabled.
    pub fn accepts_profiles(&self, required: &[String]) -> bool {
        required.is_empty() || required.iter().any(|p| self.is_profile_active(p))
    }
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            headless: true,
            profiles: Vec::new(),
        }
    }
}

/// Type-keyed lookup table of the services a context provides
///
/// At most one service per type is registered; registering the same type
/// again replaces the earlier instance.
#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    names: HashMap<TypeId, &'static str>,
}

impl ServiceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service, returning true if it replaced an existing one
    pub fn register<T: Any + Send + Sync>(&mut self, service: T) -> bool {
        let key = TypeId::of::<T>();
        self.names.insert(key, type_name::<T>());
        self.services.insert(key, Box::new(service)).is_some()
    }

    /// Look up a service by type
    ///
    /// # Errors
    ///
    /// Returns `ContextError::ServiceNotFound` naming the requested type when
    /// no service of that type was registered.
    pub fn get<T: Any + Send + Sync>(&self) -> Result<&T, ContextError> {
        self.services
            .get(&TypeId::of::<T>())
            .and_then(|service| service.downcast_ref::<T>())
            .ok_or(ContextError::ServiceNotFound(type_name::<T>()))
    }

    /// Check if a service of type `T` is registered
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<T>())
    }

    /// Type names of all registered services, sorted
    pub fn service_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.names.values().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.service_names())
            .finish()
    }
}

/// A started runtime environment
///
/// Implementations must make `close()` release every resource the context
/// holds. Calling `close()` a second time returns `ContextError::AlreadyClosed`
/// and has no other effect.
pub trait ManagedContext: Send {
    /// Identifier of the entry point that started this context
    fn entry_point(&self) -> &str;

    /// Profiles active in this context
    fn active_profiles(&self) -> &[String];

    /// Services provided by this context
    fn services(&self) -> &ServiceRegistry;

    /// Release the context's resources
    fn close(&mut self) -> Result<(), ContextError>;

    /// Whether `close()` has already completed
    fn is_closed(&self) -> bool;
}

/// A named definition that knows how to start a managed context
pub trait EntryPoint: Send + Sync {
    /// Identifier used to resolve this entry point
    fn name(&self) -> &str;

    /// Start a new context with the given settings
    ///
    /// Each call must produce an independent context; nothing started by one
    /// call may be shared with another.
    fn start(&self, settings: &ContextSettings) -> Result<Box<dyn ManagedContext>, ContextError>;
}
