//! genrunner Engine Library
//!
//! This library provides the core functionality of genrunner.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Runtime module for bootstrapping managed contexts
pub mod runtime;

/// Built-in entry points
pub mod entry;

/// Built-in generation triggers
pub mod generator;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
