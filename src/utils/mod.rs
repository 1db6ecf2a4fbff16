//! Utility modules for the dataset assembly
//!
//! This module contains table IO, filesystem discovery and logging helpers.

pub mod io;
pub mod logging;
