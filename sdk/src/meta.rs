//! Metadata lookup types
//!
//! Generators consume metadata through the [`MetaLookup`] capability. A
//! context exposes it by registering a [`MetaModule`] service.

use crate::errors::ContextError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of a metadata element
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MetaKind {
    Resource,
    DataObject,
    Attribute,
    Enum,
    Primitive,
}

/// A single metadata element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetaElement {
    pub id: String,
    pub name: String,
    pub kind: MetaKind,

    /// Id of the enclosing element, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, serde_json::Value>,

    /// Profiles this element is restricted to; empty means always visible
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<String>,
}

impl MetaElement {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: MetaKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            parent: None,
            attributes: BTreeMap::new(),
            profiles: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profiles.push(profile.into());
        self
    }
}

/// Read access to a set of metadata elements
pub trait MetaLookup: Send + Sync {
    /// Get an element by id
    fn get_meta(&self, id: &str) -> Option<&MetaElement>;

    /// All elements, ordered by id
    fn elements(&self) -> Vec<&MetaElement>;
}

/// Map-backed [`MetaLookup`]
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetaLookup {
    elements: BTreeMap<String, MetaElement>,
}

impl InMemoryMetaLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a lookup from elements, rejecting duplicate ids
    pub fn from_elements(
        elements: impl IntoIterator<Item = MetaElement>,
    ) -> Result<Self, ContextError> {
        let mut lookup = Self::new();
        for element in elements {
            lookup.insert(element)?;
        }
        Ok(lookup)
    }

    /// Add an element
    ///
    /// # Errors
    ///
    /// Returns `ContextError::Startup` if an element with the same id exists.
    pub fn insert(&mut self, element: MetaElement) -> Result<(), ContextError> {
        if self.elements.contains_key(&element.id) {
            return Err(ContextError::Startup(format!(
                "duplicate meta element id '{}'",
                element.id
            )));
        }
        self.elements.insert(element.id.clone(), element);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl MetaLookup for InMemoryMetaLookup {
    fn get_meta(&self, id: &str) -> Option<&MetaElement> {
        self.elements.get(id)
    }

    fn elements(&self) -> Vec<&MetaElement> {
        self.elements.values().collect()
    }
}

/// Service that exposes a metadata lookup from inside a context
///
/// Not `Clone`: callers only see `&MetaModule` borrowed from a running
/// context, so the lookup cannot outlive the context's services.
///
/// ```compile_fail
/// fn keep(module: &sdk::MetaModule) -> sdk::MetaModule {
///     <sdk::MetaModule as Clone>::clone(module)
/// }
/// ```
pub struct MetaModule {
    lookup: Box<dyn MetaLookup>,
}

impl MetaModule {
    pub fn new(lookup: impl MetaLookup + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// The lookup generators read from
    pub fn lookup(&self) -> &dyn MetaLookup {
        self.lookup.as_ref()
    }
}

impl std::fmt::Debug for MetaModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaModule")
            .field("elements", &self.lookup.elements().len())
            .finish()
    }
}

/// Serialized form of a set of metadata elements
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetaDocument {
    #[serde(default)]
    pub elements: Vec<MetaElement>,
}

impl MetaDocument {
    /// Parse a document from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
