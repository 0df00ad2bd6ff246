//! Error types and handling
//!
//! This module provides the error types shared by the engine and by
//! entry-point and generator authors. All errors implement the `ErrorHint`
//! trait which provides user-friendly hints and indicates whether errors are
//! recoverable.
//!
//! # Layers
//!
//! - [`ContextError`]: failures raised by managed contexts and entry points
//! - [`GenerateError`]: failures raised by generation triggers
//! - [`RunnerError`]: the only error that crosses the bootstrap adapter's
//!   public boundary; every collaborator failure is normalized into it with
//!   the original cause kept as its `source()`

use std::fmt;
use thiserror::Error;

/// Boxed cause carried by [`RunnerError::Bootstrap`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Trait for error extensions
///
/// Provides a short hint that is safe to print to a terminal, and tells the
/// caller whether retrying the same request could succeed.
pub trait ErrorHint {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    fn is_recoverable(&self) -> bool;
}

/// Phase of a bootstrap run in which a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapPhase {
    /// Starting the managed context
    Startup,
    /// Looking up the required service in the started context
    ServiceResolution,
    /// Running the caller-supplied action
    Action,
    /// Closing the managed context
    Shutdown,
}

impl fmt::Display for BootstrapPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Startup => "context startup",
            Self::ServiceResolution => "service resolution",
            Self::Action => "generation",
            Self::Shutdown => "context shutdown",
        };
        f.write_str(label)
    }
}

/// Error returned by the bootstrap adapter
///
/// Exactly one of these leaves a run. The variant identifies the kind of
/// failure; `Bootstrap` additionally names the phase and keeps the cause.
///
/// # Examples
///
/// ```
/// use sdk::errors::{BootstrapPhase, ErrorHint, RunnerError};
/// use std::io;
///
/// let err = RunnerError::bootstrap(
///     BootstrapPhase::Action,
///     io::Error::new(io::ErrorKind::PermissionDenied, "read-only output"),
/// );
/// assert_eq!(err.phase(), Some(BootstrapPhase::Action));
/// assert!(!err.user_hint().is_empty());
/// ```
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Entry point not found: {0}")]
    EntryPointNotFound(String),

    #[error("Bootstrap failed during {phase}: {source}")]
    Bootstrap {
        phase: BootstrapPhase,
        #[source]
        source: BoxError,
    },
}

impl RunnerError {
    /// Wrap a collaborator failure that happened during `phase`
    pub fn bootstrap(phase: BootstrapPhase, source: impl Into<BoxError>) -> Self {
        Self::Bootstrap {
            phase,
            source: source.into(),
        }
    }

    /// Phase that failed, for `Bootstrap` errors
    pub fn phase(&self) -> Option<BootstrapPhase> {
        match self {
            Self::Bootstrap { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

impl ErrorHint for RunnerError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Configuration(_) => {
                "Set runtime.context.entry_point and runtime.context.profile in genrunner.toml"
            }
            Self::EntryPointNotFound(_) => {
                "Unknown entry point. Run 'genrunner entry-points' to list the registered ones"
            }
            Self::Bootstrap { phase, .. } => match phase {
                BootstrapPhase::Startup => "The runtime context failed to start. Check the logs",
                BootstrapPhase::ServiceResolution => {
                    "The entry point does not provide the metadata service"
                }
                BootstrapPhase::Action => "Code generation failed. Check the output directory",
                BootstrapPhase::Shutdown => "The runtime context did not shut down cleanly",
            },
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Configuration(_) | Self::EntryPointNotFound(_) => false,
            Self::Bootstrap { phase, .. } => {
                matches!(phase, BootstrapPhase::Action | BootstrapPhase::Shutdown)
            }
        }
    }
}

/// Errors raised by entry points and managed contexts
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Entry point not found: {0}")]
    EntryPointNotFound(String),

    #[error("Context startup failed: {0}")]
    Startup(String),

    #[error("Service not registered: {0}")]
    ServiceNotFound(&'static str),

    #[error("Context already closed")]
    AlreadyClosed,

    #[error("Context shutdown failed: {0}")]
    Shutdown(String),

    #[error("Invalid metadata document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorHint for ContextError {
    fn user_hint(&self) -> &str {
        match self {
            Self::EntryPointNotFound(_) => "Unknown entry point",
            Self::Startup(_) => "The runtime context failed to start",
            Self::ServiceNotFound(_) => "A required service is missing from the context",
            Self::AlreadyClosed => "The runtime context was already closed",
            Self::Shutdown(_) => "The runtime context did not shut down cleanly",
            Self::Document(_) => "The metadata document is not valid JSON",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Shutdown(_))
    }
}

/// Errors raised by generation triggers
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Generation failed: {0}")]
    Generator(String),
}

impl ErrorHint for GenerateError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Io(_) => "Could not write generated files. Check the output directory",
            Self::Serialization(_) => "Generated output could not be serialized",
            Self::Generator(_) => "The generator rejected the metadata",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_bootstrap_error_keeps_source() {
        let err = RunnerError::bootstrap(
            BootstrapPhase::Startup,
            ContextError::Startup("port in use".to_string()),
        );

        let source = err.source().expect("source is preserved");
        assert_eq!(source.to_string(), "Context startup failed: port in use");
        assert_eq!(err.phase(), Some(BootstrapPhase::Startup));
    }

    #[test]
    fn test_bootstrap_message_names_phase() {
        let err = RunnerError::bootstrap(
            BootstrapPhase::Action,
            GenerateError::Io(io::Error::new(io::ErrorKind::Other, "disk full")),
        );

        assert_eq!(
            err.to_string(),
            "Bootstrap failed during generation: IO error: disk full"
        );
    }

    #[test]
    fn test_configuration_is_not_recoverable() {
        let err = RunnerError::Configuration("runtime.context.profile not specified".into());
        assert!(!err.is_recoverable());
        assert_eq!(err.phase(), None);
    }

    #[test]
    fn test_io_generate_error_from() {
        let err: GenerateError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, GenerateError::Io(_)));
        assert!(err.is_recoverable());
    }
}
