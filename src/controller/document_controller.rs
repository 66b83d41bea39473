use super::clock::Clock;
use super::timer::{Debounce, IntervalTimer};
use crate::config::RcConfig;
use crate::document_model::{
    CursorPosition, DocumentStats, Format, HistoryListing, SearchDirection, SearchError,
    SearchMatch, SearchState, UndoManager, VersionHistory, cursor_position, document_stats,
    floor_char_boundary, wrap_selection,
};
use crate::storage::{CONTENT_KEY, PersistentStore};
use crate::view::{Pane, PaneId, ScrollSync};

pub const WELCOME_DOCUMENT: &str = "# Welcome to Marky!

This is a **live preview** editor that supports _GitHub Flavored Markdown_.

## Features:
- Real-time preview with auto-save
- Undo/redo and a version history
- Search and replace with regular expressions
- Synchronized scrolling between editor and preview

## Task Lists
- [ ] Todo item
- [x] Completed item

> Try editing this text to see the live preview in action!
> Your changes are automatically saved.
";

/// What a call to [`DocumentController::tick`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub snapshot_taken: bool,
    pub content_saved: bool,
}

/// Owns the canonical buffer and routes every change through one path.
///
/// Undo/redo, version restores, replacements and formatting all end up in
/// [`DocumentController::set_content`] (or its non-recording twin), which
/// bumps the revision, restarts autosave, and refreshes the search matches.
pub struct DocumentController {
    buffer: String,
    revision: u64,
    selection: (usize, usize),
    undo: UndoManager,
    history: VersionHistory,
    search: SearchState,
    scroll: ScrollSync,
    store: Box<dyn PersistentStore>,
    clock: Box<dyn Clock>,
    snapshot_timer: IntervalTimer,
    autosave: Debounce,
    session_open: bool,
}

impl DocumentController {
    pub fn new(store: Box<dyn PersistentStore>, clock: Box<dyn Clock>, config: &RcConfig) -> Self {
        Self::with_initial(store, clock, config, WELCOME_DOCUMENT)
    }

    /// Start a session from `initial`, unless the store holds autosaved content
    pub fn with_initial(
        mut store: Box<dyn PersistentStore>,
        clock: Box<dyn Clock>,
        config: &RcConfig,
        initial: &str,
    ) -> Self {
        let now = clock.now_millis();
        let history = VersionHistory::load(store.as_mut(), config.history_limit);

        let mut search = SearchState::new();
        search.case_sensitive = config.case_sensitive;

        let mut controller = Self {
            buffer: initial.to_string(),
            revision: 0,
            selection: (0, 0),
            undo: UndoManager::new(initial),
            history,
            search,
            scroll: ScrollSync::new(config.sync_scroll, Pane::new(0.0, 0.0), Pane::new(0.0, 0.0)),
            store,
            clock,
            snapshot_timer: IntervalTimer::start(config.snapshot_interval_ms(), now),
            autosave: Debounce::new(config.autosave_delay_ms),
            session_open: true,
        };

        let saved = controller
            .store
            .get(CONTENT_KEY)
            .filter(|saved| !saved.is_empty());
        if let Some(saved) = saved {
            log::debug!("Restoring autosaved document ({} bytes)", saved.len());
            controller.load_external(saved);
            // Loading the saved text is not itself a change to save
            controller.autosave.take_pending();
        }

        controller.seed_history(now);
        controller
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Canonical edit path: record the previous buffer for undo
    pub fn set_content(&mut self, value: impl Into<String>) -> bool {
        self.commit(value.into(), true)
    }

    /// Adopt a buffer written by an outside actor without creating an undo step
    pub fn load_external(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.undo.resync(value.clone());
        self.commit(value, false)
    }

    fn commit(&mut self, value: String, record: bool) -> bool {
        if value == self.buffer {
            return false;
        }

        self.buffer = value;
        self.revision += 1;
        if record {
            self.undo.record(self.buffer.clone());
        }

        self.selection = (
            floor_char_boundary(&self.buffer, self.selection.0),
            floor_char_boundary(&self.buffer, self.selection.1),
        );

        let now = self.clock.now_millis();
        if self.session_open {
            self.autosave.touch(now);
        }
        self.seed_history(now);

        if self.search.is_active() {
            self.search.compute_matches(&self.buffer, self.revision);
        }
        true
    }

    fn seed_history(&mut self, now: u64) {
        self.history.seed(&self.buffer, now, self.store.as_mut());
    }

    pub fn undo(&mut self) -> bool {
        let Some(value) = self.undo.undo().map(str::to_string) else {
            return false;
        };
        self.commit(value, false);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(value) = self.undo.redo().map(str::to_string) else {
            return false;
        };
        self.commit(value, false);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Drive the snapshot timer and the autosave debounce
    pub fn tick(&mut self) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if !self.session_open {
            return outcome;
        }

        let now = self.clock.now_millis();
        if self.snapshot_timer.poll(now) {
            outcome.snapshot_taken = self
                .history
                .snapshot(&self.buffer, now, self.store.as_mut());
        }
        if self.autosave.poll(now) {
            self.save_content();
            outcome.content_saved = true;
        }
        outcome
    }

    /// Take a history snapshot now if the buffer changed since the last one
    pub fn snapshot_now(&mut self) -> bool {
        let now = self.clock.now_millis();
        self.history.snapshot(&self.buffer, now, self.store.as_mut())
    }

    fn save_content(&mut self) {
        match self.store.set(CONTENT_KEY, &self.buffer) {
            Ok(()) => log::debug!("Autosaved {} bytes", self.buffer.len()),
            Err(e) => log::warn!("Autosave failed: {e}"),
        }
    }

    /// Stop all timers, flushing a pending autosave
    pub fn end_session(&mut self) {
        if !self.session_open {
            return;
        }
        self.snapshot_timer.stop();
        if self.autosave.take_pending() {
            self.save_content();
        }
        self.session_open = false;
    }

    pub fn is_session_open(&self) -> bool {
        self.session_open
    }

    pub fn history(&self) -> &VersionHistory {
        &self.history
    }

    pub fn history_entries(&self) -> Vec<HistoryListing> {
        self.history.listing()
    }

    /// Load version `index` into the buffer as an ordinary, undoable edit.
    /// Returns false and leaves the buffer alone if there is no such version.
    pub fn restore_version(&mut self, index: usize) -> bool {
        let content = match self.history.go_to_version(index) {
            Ok(content) => content.to_string(),
            Err(e) => {
                log::debug!("Ignoring restore: {e}");
                return false;
            }
        };
        log::info!("Restoring version {index}");
        self.set_content(content);
        true
    }

    pub fn selection(&self) -> (usize, usize) {
        self.selection
    }

    pub fn set_selection(&mut self, start: usize, end: usize) {
        let start = floor_char_boundary(&self.buffer, start);
        let end = floor_char_boundary(&self.buffer, end);
        self.selection = (start.min(end), start.max(end));
    }

    pub fn cursor_position(&self) -> CursorPosition {
        cursor_position(&self.buffer, self.selection.0)
    }

    pub fn position_of(&self, offset: usize) -> CursorPosition {
        cursor_position(&self.buffer, offset)
    }

    pub fn stats(&self) -> DocumentStats {
        document_stats(&self.buffer)
    }

    /// Wrap the selection in `format`'s markdown and keep the original text selected
    pub fn apply_format(&mut self, format: &Format) {
        let (prefix, suffix) = format.delimiters();
        let (start, end) = self.selection;
        let wrapped = wrap_selection(&self.buffer, start, end, &prefix, &suffix);
        self.set_content(wrapped.text);
        self.selection = wrapped.selection;
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn set_search_pattern(&mut self, pattern: &str) -> Result<usize, SearchError> {
        self.search.set_pattern(pattern)?;
        Ok(self.search.compute_matches(&self.buffer, self.revision))
    }

    pub fn set_case_sensitive(&mut self, case_sensitive: bool) -> Result<usize, SearchError> {
        self.search.set_case_sensitive(case_sensitive)?;
        Ok(self.search.compute_matches(&self.buffer, self.revision))
    }

    fn refresh_matches(&mut self) {
        if self.search.is_active() && !self.search.is_current_for(self.revision) {
            self.search.compute_matches(&self.buffer, self.revision);
        }
    }

    fn navigate(&mut self, direction: SearchDirection) -> Option<SearchMatch> {
        self.refresh_matches();
        let found = self.search.navigate(direction)?.clone();
        self.selection = (found.start, found.end);
        Some(found)
    }

    pub fn next_match(&mut self) -> Option<SearchMatch> {
        self.navigate(SearchDirection::Next)
    }

    pub fn previous_match(&mut self) -> Option<SearchMatch> {
        self.navigate(SearchDirection::Previous)
    }

    /// Replace the selected match. Returns whether the buffer changed.
    pub fn replace_current(&mut self, replacement: &str) -> Result<bool, SearchError> {
        self.refresh_matches();
        let replaced = self
            .search
            .replace_current(&self.buffer, self.revision, replacement)?;
        Ok(match replaced {
            Some(text) => self.set_content(text),
            None => false,
        })
    }

    /// Replace every match. Returns the number of replacements.
    pub fn replace_all(&mut self, replacement: &str) -> usize {
        let (text, count) = self.search.replace_all(&self.buffer, replacement);
        if count > 0 {
            self.set_content(text);
        }
        count
    }

    pub fn search_status(&self) -> String {
        self.search.status()
    }

    /// Leave search; the buffer and both histories are untouched
    pub fn close_search(&mut self) {
        self.search.clear();
    }

    pub fn scroll_sync(&self) -> &ScrollSync {
        &self.scroll
    }

    pub fn scroll_sync_mut(&mut self) -> &mut ScrollSync {
        &mut self.scroll
    }

    pub fn set_sync_scroll(&mut self, enabled: bool) {
        self.scroll.set_enabled(enabled);
    }

    /// Report a user scroll and deliver it to the opposite pane
    pub fn on_scroll(&mut self, pane: PaneId, offset: f64) -> Vec<PaneId> {
        self.scroll.on_scroll(pane, offset);
        self.scroll.deliver()
    }

    pub fn store(&self) -> &dyn PersistentStore {
        self.store.as_ref()
    }
}

impl Drop for DocumentController {
    fn drop(&mut self) {
        self.end_session();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ManualClock;
    use crate::document_model::ChangeKind;
    use crate::storage::{FileStore, HISTORY_KEY, MemoryStore};

    const START: u64 = 1_700_000_000_000;

    fn controller_with(store: MemoryStore, initial: &str) -> (DocumentController, ManualClock) {
        let clock = ManualClock::new(START);
        let controller = DocumentController::with_initial(
            Box::new(store),
            Box::new(clock.clone()),
            &RcConfig::default(),
            initial,
        );
        (controller, clock)
    }

    #[test]
    fn test_title_undo_redo_scenario() {
        let (mut doc, _) = controller_with(MemoryStore::new(), "");
        doc.set_content("# Title");

        assert!(doc.undo());
        assert_eq!(doc.buffer(), "");
        assert!(doc.redo());
        assert_eq!(doc.buffer(), "# Title");
        assert!(!doc.redo());
    }

    #[test]
    fn test_welcome_document_seeds_history() {
        let clock = ManualClock::new(START);
        let doc = DocumentController::new(
            Box::new(MemoryStore::new()),
            Box::new(clock),
            &RcConfig::default(),
        );
        assert_eq!(doc.buffer(), WELCOME_DOCUMENT);
        assert_eq!(doc.history().len(), 1);
        assert!(!doc.can_undo());
        assert!(doc.store().get(HISTORY_KEY).is_some());
    }

    #[test]
    fn test_empty_buffer_seeds_on_first_edit() {
        let (mut doc, _) = controller_with(MemoryStore::new(), "");
        assert!(doc.history().is_empty());
        doc.set_content("first words");
        assert_eq!(doc.history().len(), 1);
        assert_eq!(doc.history().entries()[0].content, "first words");
    }

    #[test]
    fn test_autosaved_content_loads_without_undo_step() {
        let mut store = MemoryStore::new();
        store.set(CONTENT_KEY, "saved text").unwrap();

        let (mut doc, _) = controller_with(store, "initial");
        assert_eq!(doc.buffer(), "saved text");
        assert!(!doc.can_undo());

        doc.set_content("saved text, edited");
        assert!(doc.undo());
        assert_eq!(doc.buffer(), "saved text");
    }

    #[test]
    fn test_snapshot_tick_samples_latest_buffer() {
        let (mut doc, clock) = controller_with(MemoryStore::new(), "v0");
        assert_eq!(doc.history().len(), 1);

        doc.set_content("v1");
        doc.set_content("v2");
        clock.advance(9_999);
        assert!(!doc.tick().snapshot_taken);

        clock.advance(1);
        assert!(doc.tick().snapshot_taken);
        assert_eq!(doc.history().len(), 2);
        assert_eq!(doc.history().entries()[1].content, "v2");

        // Nothing changed since, so the next interval adds nothing
        clock.advance(10_000);
        assert!(!doc.tick().snapshot_taken);
        assert_eq!(doc.history().len(), 2);
    }

    #[test]
    fn test_autosave_debounces() {
        let (mut doc, clock) = controller_with(MemoryStore::new(), "");
        doc.set_content("a");
        clock.advance(300);
        doc.set_content("ab");
        clock.advance(499);
        assert!(!doc.tick().content_saved);
        assert_eq!(doc.store().get(CONTENT_KEY), None);

        clock.advance(1);
        assert!(doc.tick().content_saved);
        assert_eq!(doc.store().get(CONTENT_KEY).as_deref(), Some("ab"));
    }

    #[test]
    fn test_end_session_stops_timers_and_flushes() {
        let (mut doc, clock) = controller_with(MemoryStore::new(), "start");
        doc.set_content("unsaved");
        doc.end_session();
        assert_eq!(doc.store().get(CONTENT_KEY).as_deref(), Some("unsaved"));

        doc.set_content("after close");
        clock.advance(60_000);
        assert_eq!(doc.tick(), TickOutcome::default());
        assert_eq!(doc.history().len(), 1);
    }

    #[test]
    fn test_corrupt_history_is_discarded() {
        let mut store = MemoryStore::new();
        store.set(HISTORY_KEY, "not json").unwrap();

        let (doc, _) = controller_with(store, "fresh");
        assert_eq!(doc.history().len(), 1);
        assert_eq!(doc.history().entries()[0].content, "fresh");
    }

    #[test]
    fn test_restore_version_is_undoable() {
        let (mut doc, clock) = controller_with(MemoryStore::new(), "first");
        doc.set_content("second");
        clock.advance(10_000);
        doc.tick();

        assert!(doc.restore_version(0));
        assert_eq!(doc.buffer(), "first");
        assert_eq!(doc.history().current_index(), Some(0));

        assert!(doc.undo());
        assert_eq!(doc.buffer(), "second");
    }

    #[test]
    fn test_restore_out_of_range_leaves_buffer() {
        let (mut doc, _) = controller_with(MemoryStore::new(), "only");
        let revision = doc.revision();
        assert!(!doc.restore_version(7));
        assert_eq!(doc.buffer(), "only");
        assert_eq!(doc.revision(), revision);
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_history_listing_summaries() {
        let (mut doc, clock) = controller_with(MemoryStore::new(), "hello\nearth");
        doc.set_content("hello\nworld");
        clock.advance(10_000);
        doc.tick();

        let listing = doc.history_entries();
        assert_eq!(listing[1].summary.kind, ChangeKind::Modified);
        assert_eq!(listing[1].summary.text, "world");
        assert!(listing[1].is_current);
    }

    #[test]
    fn test_search_navigation_selects_match() {
        let (mut doc, _) = controller_with(MemoryStore::new(), "one\ntwo one\none");
        assert_eq!(doc.set_search_pattern("one").unwrap(), 3);
        assert_eq!(doc.search_status(), "1 of 3");

        let found = doc.next_match().unwrap();
        assert_eq!(doc.selection(), (found.start, found.end));
        let pos = doc.cursor_position();
        assert_eq!((pos.line, pos.column), (2, 5));

        let found = doc.previous_match().unwrap();
        assert_eq!(found.start, 0);
    }

    #[test]
    fn test_replace_current_recomputes_matches() {
        let (mut doc, _) = controller_with(MemoryStore::new(), "cat cat cat");
        doc.set_search_pattern("cat").unwrap();
        doc.next_match();

        assert!(doc.replace_current("dog").unwrap());
        assert_eq!(doc.buffer(), "cat dog cat");
        assert_eq!(doc.search().match_offsets(), vec![0, 8]);
        assert_eq!(doc.search_status(), "2 of 2");

        assert!(doc.undo());
        assert_eq!(doc.buffer(), "cat cat cat");
        assert_eq!(doc.search().matches().len(), 3);
    }

    #[test]
    fn test_replace_all_banana() {
        let (mut doc, _) = controller_with(MemoryStore::new(), "banana");
        doc.set_search_pattern("a").unwrap();
        assert_eq!(doc.replace_all("X"), 3);
        assert_eq!(doc.buffer(), "bXnXnX");
        assert_eq!(doc.search_status(), "No matches");
        assert!(!doc.search().can_replace());
    }

    #[test]
    fn test_invalid_pattern_does_not_touch_buffer() {
        let (mut doc, _) = controller_with(MemoryStore::new(), "text [");
        assert!(doc.set_search_pattern("[").is_err());
        assert!(doc.search_status().starts_with("Invalid pattern"));
        assert!(!doc.replace_current("x").unwrap());
        assert_eq!(doc.replace_all("x"), 0);
        assert_eq!(doc.buffer(), "text [");
    }

    #[test]
    fn test_close_search_has_no_side_effects() {
        let (mut doc, _) = controller_with(MemoryStore::new(), "abc abc");
        doc.set_content("abc abc abc");
        doc.set_search_pattern("abc").unwrap();
        let revision = doc.revision();
        let history_len = doc.history().len();

        doc.close_search();
        assert_eq!(doc.buffer(), "abc abc abc");
        assert_eq!(doc.revision(), revision);
        assert_eq!(doc.history().len(), history_len);
        assert!(doc.can_undo());
        assert!(!doc.search().is_active());
    }

    #[test]
    fn test_case_sensitivity_toggle() {
        let (mut doc, _) = controller_with(MemoryStore::new(), "AbcAbAB");
        assert_eq!(doc.set_search_pattern("ab").unwrap(), 3);
        assert_eq!(doc.search().match_offsets(), vec![0, 3, 5]);
        assert_eq!(doc.set_case_sensitive(true).unwrap(), 0);
    }

    #[test]
    fn test_apply_format_wraps_selection() {
        let (mut doc, _) = controller_with(MemoryStore::new(), "make this bold");
        doc.set_selection(9, 5);
        doc.apply_format(&Format::Bold);
        assert_eq!(doc.buffer(), "make **this** bold");
        assert_eq!(doc.selection(), (7, 11));

        assert!(doc.undo());
        assert_eq!(doc.buffer(), "make this bold");
    }

    #[test]
    fn test_selection_clamped_after_shrink() {
        let (mut doc, _) = controller_with(MemoryStore::new(), "a long line");
        doc.set_selection(5, 11);
        doc.set_content("a");
        assert_eq!(doc.selection(), (1, 1));
    }

    #[test]
    fn test_stats() {
        let (doc, _) = controller_with(MemoryStore::new(), "two words");
        let stats = doc.stats();
        assert_eq!((stats.bytes, stats.words, stats.characters), (9, 2, 9));
    }

    #[test]
    fn test_scroll_sync_toggle() {
        let (mut doc, _) = controller_with(MemoryStore::new(), "");
        doc.set_sync_scroll(true);
        doc.scroll_sync_mut().resize(PaneId::Editor, 1100.0, 100.0);
        doc.scroll_sync_mut().resize(PaneId::Preview, 2100.0, 100.0);

        assert_eq!(doc.on_scroll(PaneId::Editor, 500.0), vec![PaneId::Preview]);
        assert_eq!(doc.scroll_sync().pane(PaneId::Preview).scroll_offset, 1000.0);

        doc.set_sync_scroll(false);
        assert!(doc.on_scroll(PaneId::Editor, 0.0).is_empty());
        assert_eq!(doc.scroll_sync().pane(PaneId::Preview).scroll_offset, 1000.0);
    }

    #[test]
    fn test_file_store_session_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let clock = ManualClock::new(START);
        {
            let store = FileStore::open(dir.path()).unwrap();
            let mut doc = DocumentController::with_initial(
                Box::new(store),
                Box::new(clock.clone()),
                &RcConfig::default(),
                "draft",
            );
            doc.set_content("draft, revised");
            clock.advance(10_000);
            doc.tick();
        }

        let store = FileStore::open(dir.path()).unwrap();
        let doc = DocumentController::with_initial(
            Box::new(store),
            Box::new(clock),
            &RcConfig::default(),
            "ignored",
        );
        assert_eq!(doc.buffer(), "draft, revised");
        assert_eq!(doc.history().len(), 2);
    }
}
