//! Metadata index generator
//!
//! Writes `meta-index.json` to the output directory: every visible element,
//! ordered by id, with its parent and number of direct children.

use sdk::{GenerateError, GeneratorConfig, GeneratorTrigger, MetaKind, MetaLookup};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// File name of the generated index
pub const INDEX_FILE: &str = "meta-index.json";

#[derive(Debug, Serialize)]
struct IndexEntry<'a> {
    id: &'a str,
    name: &'a str,
    kind: MetaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<&'a str>,
    children: usize,
}

#[derive(Debug, Serialize)]
struct MetaIndex<'a> {
    count: usize,
    elements: Vec<IndexEntry<'a>>,
}

/// Generation trigger that writes a metadata index
#[derive(Debug, Clone)]
pub struct IndexGenerator {
    config: GeneratorConfig,
}

impl IndexGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Path the index is written to
    pub fn index_path(&self) -> PathBuf {
        self.config.output_dir.join(INDEX_FILE)
    }
}

impl GeneratorTrigger for IndexGenerator {
    fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn generate(&self, lookup: &dyn MetaLookup) -> Result<(), GenerateError> {
        let all = lookup.elements();
        let mut child_counts: HashMap<&str, usize> = HashMap::new();
        for parent in all.iter().filter_map(|e| e.parent.as_deref()) {
            *child_counts.entry(parent).or_default() += 1;
        }

        let elements: Vec<IndexEntry<'_>> = all
            .iter()
            .map(|element| IndexEntry {
                id: &element.id,
                name: &element.name,
                kind: element.kind,
                parent: element.parent.as_deref(),
                children: child_counts.get(element.id.as_str()).copied().unwrap_or(0),
            })
            .collect();
        let index = MetaIndex {
            count: elements.len(),
            elements,
        };

        fs::create_dir_all(&self.config.output_dir)?;
        let path = self.index_path();
        fs::write(&path, serde_json::to_string_pretty(&index)?)?;

        tracing::info!("Wrote {} elements to {}", index.count, path.display());
        Ok(())
    }
}
