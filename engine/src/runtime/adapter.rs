//! Runtime bootstrap adapter
//!
//! Starts a managed context for exactly one generation request, hands the
//! required service to the caller, and closes the context on every exit path.
//!
//! # Sequence
//!
//! 1. Validate the bootstrap config (no resources are touched on failure)
//! 2. Resolve the entry point by identifier
//! 3. Start a headless context with the configured profile
//! 4. Resolve the required service from the context
//! 5. Run the action with the service
//! 6. Close the context, once, whatever happened in 4 and 5
//!
//! # Errors
//!
//! Every failure leaves as a single [`RunnerError`]. When both the action and
//! the close fail, the action's error is returned and the close error is
//! logged.
//!
//! # Examples
//!
//! ```no_run
//! use genrunner_engine::runtime::{EntryPointRegistry, RuntimeBootstrapAdapter};
//! use sdk::{BootstrapConfig, MetaLookup, MetaModule};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = EntryPointRegistry::new();
//! let mut adapter = RuntimeBootstrapAdapter::new(Arc::new(registry));
//! let config = BootstrapConfig::new("meta-document", "default");
//!
//! adapter.run_with::<MetaModule, _>(&config, |module| {
//!     println!("{} elements", module.lookup().elements().len());
//!     Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```

use super::guard::ContextGuard;
use super::registry::EntryPointResolver;
use super::state::{BootstrapState, Lifecycle};
use sdk::{
    BootstrapConfig, BootstrapPhase, ContextError, ContextSettings, EntryPoint, GenerateError,
    GeneratorTrigger, MetaModule, RunnerError,
};
use std::any::Any;
use std::sync::Arc;

/// Scoped bootstrap of a managed context
///
/// Each run starts and closes its own context; nothing is shared between
/// runs. Not meant to be shared across threads while running; the `&mut self`
/// receiver enforces one run at a time per adapter.
pub struct RuntimeBootstrapAdapter {
    resolver: Arc<dyn EntryPointResolver>,
    last_state: BootstrapState,
}

impl RuntimeBootstrapAdapter {
    pub fn new(resolver: Arc<dyn EntryPointResolver>) -> Self {
        Self {
            resolver,
            last_state: BootstrapState::NotStarted,
        }
    }

    /// State the most recent run ended in
    ///
    /// Also recorded when the action panics: the context is closed while
    /// unwinding, so such a run reports `Closed`.
    pub fn last_state(&self) -> BootstrapState {
        self.last_state
    }

    /// Run a generation trigger against the metadata service
    ///
    /// The bootstrap config is taken from `trigger.config().runtime.context`;
    /// the context must provide a [`MetaModule`].
    pub fn run(&mut self, trigger: &dyn GeneratorTrigger) -> Result<(), RunnerError> {
        let config = &trigger.config().runtime.context;
        self.run_with::<MetaModule, _>(config, |module| trigger.generate(module.lookup()))
    }

    /// Run `action` with the service of type `S` from a freshly started context
    ///
    /// # Errors
    ///
    /// - `RunnerError::Configuration` if the entry point or profile is missing
    /// - `RunnerError::EntryPointNotFound` if the entry point is not registered
    /// - `RunnerError::Bootstrap` if startup, service resolution, the action,
    ///   or the close fails
    ///
    /// The service is only lent to `action`; a reference to it cannot be kept
    /// past the call:
    ///
    /// ```compile_fail
    /// use genrunner_engine::runtime::{EntryPointRegistry, RuntimeBootstrapAdapter};
    /// use sdk::{BootstrapConfig, MetaModule};
    /// use std::sync::Arc;
    ///
    /// let mut adapter = RuntimeBootstrapAdapter::new(Arc::new(EntryPointRegistry::new()));
    /// let config = BootstrapConfig::new("meta-document", "default");
    /// let mut kept: Option<&MetaModule> = None;
    /// let _ = adapter.run_with::<MetaModule, _>(&config, |module| {
    ///     kept = Some(module);
    ///     Ok(())
    /// });
    /// drop(kept);
    /// ```
    pub fn run_with<S, F>(&mut self, config: &BootstrapConfig, action: F) -> Result<(), RunnerError>
    where
        S: Any + Send + Sync,
        F: FnOnce(&S) -> Result<(), GenerateError>,
    {
        let mut recorder = StateRecorder {
            lifecycle: Lifecycle::default(),
            slot: &mut self.last_state,
        };
        let result = execute(self.resolver.as_ref(), config, action, &mut recorder.lifecycle);
        if let Err(e) = &result {
            tracing::error!("Bootstrap run failed: {}", e);
            recorder.lifecycle.fail();
        }
        result
    }
}

/// Writes the run's final state back to the adapter, including on unwind
struct StateRecorder<'a> {
    lifecycle: Lifecycle,
    slot: &'a mut BootstrapState,
}

impl Drop for StateRecorder<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.lifecycle.unwound();
        }
        *self.slot = self.lifecycle.state();
    }
}

fn execute<S, F>(
    resolver: &dyn EntryPointResolver,
    config: &BootstrapConfig,
    action: F,
    lifecycle: &mut Lifecycle,
) -> Result<(), RunnerError>
where
    S: Any + Send + Sync,
    F: FnOnce(&S) -> Result<(), GenerateError>,
{
    let target = config.validate()?;
    let entry_point = resolve(resolver, target.entry_point)?;
    let settings = ContextSettings::headless(target.profile);

    tracing::info!(
        "Starting context '{}' with profile '{}'",
        target.entry_point,
        target.profile
    );
    lifecycle.advance(BootstrapState::Starting);
    let context = entry_point
        .start(&settings)
        .map_err(|e| RunnerError::bootstrap(BootstrapPhase::Startup, e))?;
    lifecycle.advance(BootstrapState::Running);

    let guard = ContextGuard::new(context);
    let outcome = invoke::<S, F>(&guard, action);

    lifecycle.advance(BootstrapState::Closing);
    let closed = guard.close();
    lifecycle.advance(BootstrapState::Closed);

    match (outcome, closed) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(close_err)) => Err(RunnerError::bootstrap(
            BootstrapPhase::Shutdown,
            close_err,
        )),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            tracing::warn!(
                "Context close also failed after an earlier error: {}",
                close_err
            );
            Err(e)
        }
    }
}

fn resolve(
    resolver: &dyn EntryPointResolver,
    identifier: &str,
) -> Result<Arc<dyn EntryPoint>, RunnerError> {
    resolver.resolve(identifier).map_err(|e| match e {
        ContextError::EntryPointNotFound(id) => RunnerError::EntryPointNotFound(id),
        other => RunnerError::bootstrap(BootstrapPhase::Startup, other),
    })
}

fn invoke<S, F>(guard: &ContextGuard, action: F) -> Result<(), RunnerError>
where
    S: Any + Send + Sync,
    F: FnOnce(&S) -> Result<(), GenerateError>,
{
    let service = guard.services().get::<S>().map_err(|e| {
        tracing::error!(
            "Entry point '{}' does not provide the required service: {}",
            guard.entry_point(),
            e
        );
        RunnerError::bootstrap(BootstrapPhase::ServiceResolution, e)
    })?;

    action(service).map_err(|e| RunnerError::bootstrap(BootstrapPhase::Action, e))
}
