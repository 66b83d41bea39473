//! Configuration subsystem - Editor settings and preferences
//!
//! This module handles loading configuration from .markyrc files: history
//! snapshot cadence and size, autosave delay, scroll sync and search defaults.

pub mod rc;

// Re-export public interface
pub use rc::{RcConfig, RcLoader};
