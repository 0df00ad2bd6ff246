//! Runtime module for bootstrapping managed contexts
//!
//! This module provides:
//! - RuntimeBootstrapAdapter: starts a context, runs an action against one of
//!   its services, and always closes it
//! - EntryPointRegistry: table lookup from identifier to entry point
//! - ApplicationContext: the context type entry points build

pub mod adapter;
pub mod application;
pub mod guard;
pub mod registry;
pub mod state;

pub use adapter::RuntimeBootstrapAdapter;
pub use application::{ApplicationContext, ContextBuilder};
pub use guard::ContextGuard;
pub use registry::{EntryPointRegistry, EntryPointResolver};
pub use state::BootstrapState;
