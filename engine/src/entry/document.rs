//! Metadata document entry point
//!
//! Starts a context whose [`MetaModule`] is read from a JSON document on
//! disk. Elements listing `profiles` are only visible when one of those
//! profiles is active.
//!
//! ```json
//! {
//!   "elements": [
//!     { "id": "tasks", "name": "Task", "kind": "resource" },
//!     { "id": "tasks.debug", "name": "debug", "kind": "attribute",
//!       "parent": "tasks", "profiles": ["dev"] }
//!   ]
//! }
//! ```

use crate::runtime::ContextBuilder;
use sdk::{
    ContextError, ContextSettings, EntryPoint, InMemoryMetaLookup, ManagedContext, MetaDocument,
    MetaElement, MetaLookup, MetaModule,
};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

/// Identifier the document entry point is registered under
pub const DOCUMENT_ENTRY_POINT: &str = "meta-document";

/// Entry point backed by a metadata document
#[derive(Debug, Clone)]
pub struct DocumentEntryPoint {
    name: String,
    source: PathBuf,
}

impl DocumentEntryPoint {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self::named(DOCUMENT_ENTRY_POINT, source)
    }

    /// Document entry point registered under a custom identifier
    pub fn named(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    fn load(&self, settings: &ContextSettings) -> Result<InMemoryMetaLookup, ContextError> {
        let contents = fs::read_to_string(&self.source).map_err(|e| {
            tracing::error!(
                "Failed to read metadata document {}: {}",
                self.source.display(),
                e
            );
            e
        })?;
        let document = MetaDocument::from_json(&contents)?;

        let total = document.elements.len();
        let lookup = InMemoryMetaLookup::from_elements(visible_elements(document, settings))?;

        for element in lookup.elements() {
            if let Some(parent) = element.parent.as_deref() {
                if lookup.get_meta(parent).is_none() {
                    tracing::warn!(
                        "Metadata element '{}' refers to unknown parent '{}'",
                        element.id,
                        parent
                    );
                }
            }
        }

        tracing::debug!(
            "Loaded {} of {} metadata elements from {}",
            lookup.len(),
            total,
            self.source.display()
        );
        Ok(lookup)
    }
}

/// Elements visible under the active profiles
///
/// An element whose parent is hidden is hidden too, down the whole subtree.
fn visible_elements(document: MetaDocument, settings: &ContextSettings) -> Vec<MetaElement> {
    let (mut visible, hidden): (Vec<_>, Vec<_>) = document
        .elements
        .into_iter()
        .partition(|element| settings.accepts_profiles(&element.profiles));
    let mut hidden_ids: HashSet<String> = hidden.into_iter().map(|e| e.id).collect();

    loop {
        let before = visible.len();
        visible.retain(|element| match element.parent.as_deref() {
            Some(parent) if hidden_ids.contains(parent) => {
                hidden_ids.insert(element.id.clone());
                false
            }
            _ => true,
        });
        if visible.len() == before {
            break;
        }
    }
    visible
}

impl EntryPoint for DocumentEntryPoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, settings: &ContextSettings) -> Result<Box<dyn ManagedContext>, ContextError> {
        if !settings.headless {
            tracing::warn!("'{}' has no network environment, starting headless", self.name);
        }

        let lookup = self.load(settings)?;
        let mut builder = ContextBuilder::new(self.name.clone(), settings);
        builder.register(MetaModule::new(lookup));
        Ok(Box::new(builder.build()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DOCUMENT: &str = r#"{
        "elements": [
            { "id": "tasks", "name": "Task", "kind": "resource" },
            { "id": "tasks.debug", "name": "debug", "kind": "attribute",
              "parent": "tasks", "profiles": ["dev"] }
        ]
    }"#;

    fn write_document(contents: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meta.json");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_profile_restricted_elements() {
        let (_dir, path) = write_document(DOCUMENT);
        let entry = DocumentEntryPoint::new(&path);

        let dev = entry.start(&ContextSettings::headless("dev")).unwrap();
        let module = dev.services().get::<MetaModule>().unwrap();
        assert!(module.lookup().get_meta("tasks.debug").is_some());

        let prod = entry.start(&ContextSettings::headless("prod")).unwrap();
        let module = prod.services().get::<MetaModule>().unwrap();
        assert!(module.lookup().get_meta("tasks.debug").is_none());
        assert!(module.lookup().get_meta("tasks").is_some());
    }

    #[test]
    fn test_hidden_parent_hides_subtree() {
        let (_dir, path) = write_document(
            r#"{
            "elements": [
                { "id": "audit", "name": "Audit", "kind": "resource", "profiles": ["dev"] },
                { "id": "audit.entry", "name": "Entry", "kind": "data_object", "parent": "audit" },
                { "id": "audit.entry.at", "name": "at", "kind": "attribute",
                  "parent": "audit.entry" },
                { "id": "tasks", "name": "Task", "kind": "resource" }
            ]
        }"#,
        );
        let entry = DocumentEntryPoint::new(&path);

        let prod = entry.start(&ContextSettings::headless("prod")).unwrap();
        let module = prod.services().get::<MetaModule>().unwrap();
        let ids: Vec<&str> = module
            .lookup()
            .elements()
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["tasks"]);

        let dev = entry.start(&ContextSettings::headless("dev")).unwrap();
        let module = dev.services().get::<MetaModule>().unwrap();
        assert_eq!(module.lookup().elements().len(), 4);
    }

    #[test]
    fn test_missing_document_is_io_error() {
        let entry = DocumentEntryPoint::new("/nonexistent/meta.json");
        let err = entry.start(&ContextSettings::headless("dev")).err().unwrap();
        assert!(matches!(err, ContextError::Io(_)));
    }

    #[test]
    fn test_invalid_document() {
        let (_dir, path) = write_document("{ not json");
        let entry = DocumentEntryPoint::new(&path);
        let err = entry.start(&ContextSettings::headless("dev")).err().unwrap();
        assert!(matches!(err, ContextError::Document(_)));
    }

    #[test]
    fn test_context_carries_name_and_profile() {
        let (_dir, path) = write_document(DOCUMENT);
        let entry = DocumentEntryPoint::named("custom", &path);
        let context = entry.start(&ContextSettings::headless("dev")).unwrap();
        assert_eq!(context.entry_point(), "custom");
        assert_eq!(context.active_profiles(), ["dev"]);
    }
}
