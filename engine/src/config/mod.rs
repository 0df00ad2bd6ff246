//! Configuration management
//!
//! This module handles loading, validation, and management of the genrunner
//! configuration. Configuration is stored in TOML format, by default at
//! `./genrunner.toml`.
//!
//! # Configuration Sections
//!
//! - **core**: log level, output directory
//! - **runtime.context**: entry point, activation profile, metadata document
//!
//! # Path Handling
//!
//! - `~` expands to the user's home directory
//! - Relative paths are resolved against the directory of the config file
//!
//! A missing entry point or profile is not a load error. The bootstrap
//! adapter rejects it when a run is attempted, so every caller sees the same
//! `RunnerError::Configuration`.
//!
//! # Examples
//!
//! ```no_run
//! use genrunner_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_default()?;
//! println!("Output: {:?}", config.core.output_dir);
//! # Ok(())
//! # }
//! ```

use sdk::{BootstrapConfig, GeneratorConfig, RunnerError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "genrunner.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Core settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Runtime bootstrap settings
    #[serde(default)]
    pub runtime: RuntimeSection,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory generated files are written to (supports ~ expansion)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            output_dir: default_output_dir(),
        }
    }
}

/// `[runtime]` section
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RuntimeSection {
    #[serde(default)]
    pub context: ContextSection,
}

/// `[runtime.context]` section
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContextSection {
    /// Identifier of the entry point to start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,

    /// Activation profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Metadata document for the `meta-document` entry point
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

impl Config {
    /// Load `./genrunner.toml` if it exists, otherwise use defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed, or
    /// validated.
    pub fn load_or_default() -> Result<Self, RunnerError> {
        let path = PathBuf::from(CONFIG_FILE);
        if path.exists() {
            Self::load_from_path(&path)
        } else {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE);
            let mut config = Self::default();
            config.validate_and_process(Path::new("."))?;
            Ok(config)
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_from_path(path: &Path) -> Result<Self, RunnerError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            RunnerError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        let mut config = Self::from_toml(&contents)?;

        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        config.validate_and_process(base)?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration without validating or resolving paths
    pub fn from_toml(contents: &str) -> Result<Self, RunnerError> {
        toml::from_str(contents)
            .map_err(|e| RunnerError::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Apply command-line overrides on top of the loaded values
    ///
    /// The output directory goes through the same `~` expansion as the file
    /// value; relative paths are taken from the working directory.
    pub fn apply_overrides(
        &mut self,
        entry_point: Option<String>,
        profile: Option<String>,
        output_dir: Option<PathBuf>,
    ) -> Result<(), RunnerError> {
        if let Some(entry_point) = entry_point {
            self.runtime.context.entry_point = Some(entry_point);
        }
        if let Some(profile) = profile {
            self.runtime.context.profile = Some(profile);
        }
        if let Some(output_dir) = output_dir {
            self.core.output_dir = resolve_path(Path::new("."), &output_dir)?;
        }
        Ok(())
    }

    /// Replace the log level, rejecting unknown levels
    pub fn set_log_level(&mut self, level: &str) -> Result<(), RunnerError> {
        validate_log_level(level)?;
        self.core.log_level = level.to_string();
        Ok(())
    }

    /// Bootstrap settings for the adapter
    pub fn bootstrap_config(&self) -> BootstrapConfig {
        BootstrapConfig {
            entry_point: self.runtime.context.entry_point.clone(),
            profile: self.runtime.context.profile.clone(),
        }
    }

    /// Configuration handed to the generation trigger
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig::new(self.core.output_dir.clone(), self.bootstrap_config())
    }

    /// Validate values and resolve paths relative to `base`
    fn validate_and_process(&mut self, base: &Path) -> Result<(), RunnerError> {
        validate_log_level(&self.core.log_level)?;

        self.core.output_dir = resolve_path(base, &self.core.output_dir)?;
        if let Some(document) = &self.runtime.context.document {
            self.runtime.context.document = Some(resolve_path(base, document)?);
        }

        Ok(())
    }
}

fn validate_log_level(level: &str) -> Result<(), RunnerError> {
    const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    if VALID_LOG_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(RunnerError::Configuration(format!(
            "Invalid log level '{}'. Must be one of: {}",
            level,
            VALID_LOG_LEVELS.join(", ")
        )))
    }
}

/// Expand `~`, then anchor relative paths at `base`
fn resolve_path(base: &Path, path: &Path) -> Result<PathBuf, RunnerError> {
    let expanded = expand_path(path)?;
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(base.join(expanded))
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, RunnerError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| RunnerError::Configuration("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = home_dir()?;
        Ok(home.join(rest))
    } else if path_str == "~" {
        home_dir()
    } else {
        Ok(path.to_path_buf())
    }
}

fn home_dir() -> Result<PathBuf, RunnerError> {
    dirs::home_dir().ok_or_else(|| {
        RunnerError::Configuration("Could not determine home directory".to_string())
    })
}
