//! Application context
//!
//! The concrete [`ManagedContext`] entry points build with a
//! [`ContextBuilder`]: a set of registered services plus shutdown hooks.
//! Closing runs the hooks once, in reverse registration order, then drops
//! every service.

use sdk::{ContextError, ContextSettings, ManagedContext, ServiceRegistry};
use std::any::Any;

type ShutdownHook = Box<dyn FnOnce() -> Result<(), ContextError> + Send>;

/// Builder used by entry points while starting a context
pub struct ContextBuilder {
    entry_point: String,
    settings: ContextSettings,
    services: ServiceRegistry,
    hooks: Vec<(String, ShutdownHook)>,
}

impl ContextBuilder {
    pub fn new(entry_point: impl Into<String>, settings: &ContextSettings) -> Self {
        Self {
            entry_point: entry_point.into(),
            settings: settings.clone(),
            services: ServiceRegistry::new(),
            hooks: Vec::new(),
        }
    }

    /// Register a service in the context
    pub fn register<T: Any + Send + Sync>(&mut self, service: T) -> &mut Self {
        if self.services.register(service) {
            tracing::warn!(
                "Service {} registered twice in '{}'",
                std::any::type_name::<T>(),
                self.entry_point
            );
        }
        self
    }

    /// Add a hook that runs when the context closes
    pub fn on_shutdown<F>(&mut self, name: impl Into<String>, hook: F) -> &mut Self
    where
        F: FnOnce() -> Result<(), ContextError> + Send + 'static,
    {
        self.hooks.push((name.into(), Box::new(hook)));
        self
    }

    /// Finish startup
    pub fn build(self) -> ApplicationContext {
        tracing::info!(
            "Context '{}' started (profiles: [{}], services: {}, headless: {})",
            self.entry_point,
            self.settings.profiles.join(", "),
            self.services.len(),
            self.settings.headless
        );
        ApplicationContext {
            entry_point: self.entry_point,
            profiles: self.settings.profiles,
            services: self.services,
            hooks: self.hooks,
            closed: false,
        }
    }
}

/// A started context owning services and shutdown hooks
pub struct ApplicationContext {
    entry_point: String,
    profiles: Vec<String>,
    services: ServiceRegistry,
    hooks: Vec<(String, ShutdownHook)>,
    closed: bool,
}

impl ManagedContext for ApplicationContext {
    fn entry_point(&self) -> &str {
        &self.entry_point
    }

    fn active_profiles(&self) -> &[String] {
        &self.profiles
    }

    fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    /// Run shutdown hooks and drop services
    ///
    /// Every hook runs even if an earlier one fails; the failures are
    /// reported together.
    fn close(&mut self) -> Result<(), ContextError> {
        if self.closed {
            return Err(ContextError::AlreadyClosed);
        }
        self.closed = true;

        let mut failures = Vec::new();
        while let Some((name, hook)) = self.hooks.pop() {
            tracing::debug!("Running shutdown hook '{}'", name);
            if let Err(e) = hook() {
                tracing::error!("Shutdown hook '{}' failed: {}", name, e);
                failures.push(format!("{}: {}", name, e));
            }
        }
        self.services = ServiceRegistry::new();

        if failures.is_empty() {
            tracing::info!("Context '{}' closed", self.entry_point);
            Ok(())
        } else {
            Err(ContextError::Shutdown(failures.join("; ")))
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for ApplicationContext {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.close() {
                tracing::error!("Error closing context '{}': {}", self.entry_point, e);
            }
        }
    }
}
