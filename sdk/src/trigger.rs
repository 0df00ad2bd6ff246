//! Generation trigger contract and bootstrap settings

use crate::errors::{GenerateError, RunnerError};
use crate::meta::MetaLookup;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which entry point to start, and with which profile
///
/// Both fields are optional here so that a partially written config file
/// still loads; the bootstrap adapter rejects missing values via
/// [`BootstrapConfig::validate`] before acquiring anything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BootstrapConfig {
    /// Identifier of the entry point to start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,

    /// Activation profile applied to the started context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

/// Validated view of a [`BootstrapConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapTarget<'a> {
    pub entry_point: &'a str,
    pub profile: &'a str,
}

impl BootstrapConfig {
    pub fn new(entry_point: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            entry_point: Some(entry_point.into()),
            profile: Some(profile.into()),
        }
    }

    /// Check that both fields are present and not blank
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::Configuration` naming the first missing field.
    pub fn validate(&self) -> Result<BootstrapTarget<'_>, RunnerError> {
        let entry_point = required(&self.entry_point, "runtime.context.entry_point")?;
        let profile = required(&self.profile, "runtime.context.profile")?;
        Ok(BootstrapTarget {
            entry_point,
            profile,
        })
    }
}

fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str, RunnerError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RunnerError::Configuration(format!("{} not specified", key)))
}

/// Runtime section of a generator's configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub context: BootstrapConfig,
}

/// Configuration a generation trigger carries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Directory generated files are written to
    pub output_dir: PathBuf,

    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl GeneratorConfig {
    pub fn new(output_dir: impl Into<PathBuf>, context: BootstrapConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            runtime: RuntimeConfig { context },
        }
    }
}

/// Performs code generation once given a metadata lookup
pub trait GeneratorTrigger {
    /// Configuration for this generation request
    fn config(&self) -> &GeneratorConfig;

    /// Generate output from the metadata
    fn generate(&self, lookup: &dyn MetaLookup) -> Result<(), GenerateError>;
}
