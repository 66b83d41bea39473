//! Controller subsystem - Owns the document and drives the engine
//!
//! The document controller is the single writer of the buffer. It routes edits
//! into undo/redo and version history, exposes the buffer to search, pairs the
//! two scroll panes, and runs the snapshot and autosave timers from `tick`.

pub mod clock;
pub mod document_controller;
pub mod timer;

// Re-export public interface
pub use clock::{Clock, ManualClock, SystemClock};
pub use document_controller::{DocumentController, TickOutcome, WELCOME_DOCUMENT};
pub use timer::{Debounce, IntervalTimer};
