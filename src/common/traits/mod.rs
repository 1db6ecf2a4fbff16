//! Common traits used across the codebase
//!
//! This module defines traits that are used by multiple modules to avoid
//! circular dependencies and provide clear interfaces.

pub mod collection;
pub mod discovery;

// Re-export collection traits
pub use collection::SubjectRowCollection;

// Re-export discovery traits
pub use discovery::FileDiscovery;
