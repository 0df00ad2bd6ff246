//! genrunner SDK
//!
//! Shared contracts for genrunner components: managed contexts and the
//! entry points that start them, the metadata lookup capability, the
//! generation trigger, and the error taxonomy. Used by the engine and by
//! anyone writing an entry point or a generator.

/// Managed context, entry point, and service registry contracts
pub mod context;

/// Error types and handling
pub mod errors;

/// Metadata lookup types
pub mod meta;

/// Generation trigger and bootstrap settings
pub mod trigger;

// Re-export commonly used types
pub use context::{ContextSettings, EntryPoint, ManagedContext, ServiceRegistry};
pub use errors::{BootstrapPhase, ContextError, ErrorHint, GenerateError, RunnerError};
pub use meta::{InMemoryMetaLookup, MetaDocument, MetaElement, MetaKind, MetaLookup, MetaModule};
pub use trigger::{BootstrapConfig, BootstrapTarget, GeneratorConfig, GeneratorTrigger, RuntimeConfig};
