//! Document state engine for a two-pane markdown editor: undo/redo, durable
//! version history, regex search and replace, and editor/preview scroll sync.

pub mod config;
pub mod controller;
pub mod document_model;
pub mod storage;
pub mod view;

pub use controller::DocumentController;
