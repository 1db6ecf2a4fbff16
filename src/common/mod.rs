//! Common traits
//!
//! This module provides the interfaces shared between the clinical tables,
//! the assemblers and the filesystem layer, helping to avoid circular
//! dependencies.

pub mod traits;

// Re-export common traits for easier imports
pub use traits::*;
