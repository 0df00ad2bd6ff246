//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - generate: run the index generator inside a freshly started context
//! - entry-points: list registered entry points
//! - check: validate configuration and resolve the entry point

use anyhow::Result;
use serde_json::json;
use std::sync::Arc;

use crate::config::Config;
use crate::entry::builtin_registry;
use crate::generator::IndexGenerator;
use crate::runtime::{EntryPointResolver, RuntimeBootstrapAdapter};
use sdk::{ErrorHint, RunnerError};

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Start the configured context and write the metadata index
pub fn handle_generate(config: &Config, format: OutputFormat) -> Result<()> {
    let registry = builtin_registry(config);
    let mut adapter = RuntimeBootstrapAdapter::new(Arc::new(registry));
    let generator = IndexGenerator::new(config.generator_config());

    if let Err(e) = adapter.run(&generator) {
        report_failure(&e, format);
        return Err(e.into());
    }

    let path = generator.index_path();
    match format {
        OutputFormat::Text => println!("Generated {}", path.display()),
        OutputFormat::Json => println!(
            "{}",
            json!({ "status": "ok", "output": path.display().to_string() })
        ),
    }
    Ok(())
}

/// List the entry points available with this configuration
pub fn handle_entry_points(config: &Config, format: OutputFormat) -> Result<()> {
    let registry = builtin_registry(config);
    let identifiers = registry.identifiers();

    match format {
        OutputFormat::Text => {
            if identifiers.is_empty() {
                println!("No entry points registered.");
                println!("Set runtime.context.document to enable 'meta-document'.");
            } else {
                println!("Entry points:");
                for id in &identifiers {
                    println!("  {}", id);
                }
            }
        }
        OutputFormat::Json => println!("{}", json!({ "entry_points": identifiers })),
    }
    Ok(())
}

/// Validate the bootstrap settings without starting anything
pub fn handle_check(config: &Config, format: OutputFormat) -> Result<()> {
    let bootstrap = config.bootstrap_config();
    let result = bootstrap.validate().and_then(|target| {
        builtin_registry(config)
            .resolve(target.entry_point)
            .map(|_| target)
            .map_err(|_| RunnerError::EntryPointNotFound(target.entry_point.to_string()))
    });

    match result {
        Ok(target) => {
            match format {
                OutputFormat::Text => {
                    println!("Configuration OK");
                    println!("  Entry point: {}", target.entry_point);
                    println!("  Profile:     {}", target.profile);
                    println!("  Output:      {}", config.core.output_dir.display());
                }
                OutputFormat::Json => println!(
                    "{}",
                    json!({
                        "status": "ok",
                        "entry_point": target.entry_point,
                        "profile": target.profile,
                        "output": config.core.output_dir.display().to_string(),
                    })
                ),
            }
            Ok(())
        }
        Err(e) => {
            report_failure(&e, format);
            Err(e.into())
        }
    }
}

fn report_failure(error: &RunnerError, format: OutputFormat) {
    match format {
        OutputFormat::Text => eprintln!("Hint: {}", error.user_hint()),
        OutputFormat::Json => println!(
            "{}",
            json!({
                "status": "error",
                "error": error.to_string(),
                "hint": error.user_hint(),
                "recoverable": error.is_recoverable(),
            })
        ),
    }
}
