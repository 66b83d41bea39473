//! Document model subsystem - Buffer state engines
//!
//! This module contains the stateful pieces that operate on the document text:
//! undo/redo, durable version history, regex search and replace, cursor and
//! count statistics, and markdown formatting helpers.

pub mod formatting;
pub mod search_state;
pub mod text_stats;
pub mod undo;
pub mod version_history;

// Re-export main types for convenience
pub use formatting::{Format, Wrapped, wrap_selection};
pub use search_state::{SearchDirection, SearchError, SearchMatch, SearchState};
pub use text_stats::{
    CursorPosition, DocumentStats, cursor_position, document_stats, floor_char_boundary,
};
pub use undo::UndoManager;
pub use version_history::{
    ChangeKind, DEFAULT_HISTORY_LIMIT, DiffSummary, HistoryEntry, HistoryError, HistoryListing,
    VersionHistory, diff_summary,
};
