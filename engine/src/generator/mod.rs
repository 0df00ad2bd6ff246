//! Built-in generation triggers

pub mod index;

pub use index::{IndexGenerator, INDEX_FILE};
