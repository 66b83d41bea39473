//! Storage subsystem - Durable key/value persistence
//!
//! This module provides the synchronous key/value store the engine persists
//! the autosaved document and the version history into, plus the keys it uses.

pub mod store;

// Re-export public interface
pub use store::{FileStore, MemoryStore, PersistentStore, StorageError};

/// Raw text of the document, written by autosave and read back on load
pub const CONTENT_KEY: &str = "markdown-content";

/// JSON array of history entries
pub const HISTORY_KEY: &str = "markdown-history";
