//! Built-in entry points

pub mod document;

pub use document::{DocumentEntryPoint, DOCUMENT_ENTRY_POINT};

use crate::config::Config;
use crate::runtime::EntryPointRegistry;

/// Registry holding the entry points available from configuration
///
/// The document entry point is only registered when
/// `runtime.context.document` is set.
pub fn builtin_registry(config: &Config) -> EntryPointRegistry {
    let mut registry = EntryPointRegistry::new();
    if let Some(document) = &config.runtime.context.document {
        registry.register(DocumentEntryPoint::new(document.clone()));
    } else {
        tracing::debug!("No metadata document configured, '{}' unavailable", DOCUMENT_ENTRY_POINT);
    }
    registry
}
