//! Entry point resolution
//!
//! Entry points are looked up by identifier in a table populated at startup.
//! Nothing is loaded by name at runtime; an identifier either maps to a
//! registered [`EntryPoint`] or resolution fails with
//! `ContextError::EntryPointNotFound`.

use sdk::{ContextError, EntryPoint};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Maps entry point identifiers to definitions
pub trait EntryPointResolver: Send + Sync {
    /// Resolve an identifier to an entry point
    fn resolve(&self, identifier: &str) -> Result<Arc<dyn EntryPoint>, ContextError>;

    /// All identifiers this resolver knows, sorted
    fn identifiers(&self) -> Vec<String>;
}

/// Table-backed [`EntryPointResolver`]
#[derive(Default, Clone)]
pub struct EntryPointRegistry {
    entries: BTreeMap<String, Arc<dyn EntryPoint>>,
}

impl EntryPointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry point under its own name
    ///
    /// Returns true if an entry point with the same name was replaced.
    pub fn register(&mut self, entry_point: impl EntryPoint + 'static) -> bool {
        self.register_shared(Arc::new(entry_point))
    }

    /// Register an already shared entry point under its own name
    pub fn register_shared(&mut self, entry_point: Arc<dyn EntryPoint>) -> bool {
        let name = entry_point.name().to_string();
        tracing::debug!("Registering entry point '{}'", name);
        let replaced = self.entries.insert(name.clone(), entry_point).is_some();
        if replaced {
            tracing::warn!("Entry point '{}' replaced an earlier registration", name);
        }
        replaced
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EntryPointResolver for EntryPointRegistry {
    fn resolve(&self, identifier: &str) -> Result<Arc<dyn EntryPoint>, ContextError> {
        self.entries.get(identifier).cloned().ok_or_else(|| {
            tracing::error!("Entry point '{}' is not registered", identifier);
            ContextError::EntryPointNotFound(identifier.to_string())
        })
    }

    fn identifiers(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

impl std::fmt::Debug for EntryPointRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryPointRegistry")
            .field("entries", &self.identifiers())
            .finish()
    }
}
