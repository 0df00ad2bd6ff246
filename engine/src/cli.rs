//! CLI interface for genrunner
//!
//! This module provides the command-line interface using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// genrunner
///
/// Starts a managed runtime context, reads its metadata, and runs a
/// generator against it.
#[derive(Parser, Debug)]
#[command(name = "genrunner")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the configured context and generate the metadata index
    Generate {
        /// Entry point identifier (overrides runtime.context.entry_point)
        #[arg(long, value_name = "ID")]
        entry_point: Option<String>,

        /// Activation profile (overrides runtime.context.profile)
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,

        /// Output directory (overrides core.output_dir)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// List registered entry points
    EntryPoints,

    /// Validate configuration and resolve the entry point without starting it
    Check,
}
