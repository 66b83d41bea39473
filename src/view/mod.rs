//! View subsystem - Pane coordination and display helpers
//!
//! Scroll synchronization between the editor and preview panes, and terminal
//! rendering of the version history listing.

pub mod history_view;
pub mod scroll_sync;

// Re-export public interface
pub use history_view::{format_timestamp, render_history};
pub use scroll_sync::{Pane, PaneId, ScrollChannel, ScrollSync};
