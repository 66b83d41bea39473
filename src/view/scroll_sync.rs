/// Which of the two synchronized panes an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneId {
    Editor,
    Preview,
}

impl PaneId {
    pub fn other(&self) -> PaneId {
        match self {
            PaneId::Editor => PaneId::Preview,
            PaneId::Preview => PaneId::Editor,
        }
    }
}

/// Scroll geometry of one pane, in whatever unit the host measures
#[derive(Debug, Clone, PartialEq)]
pub struct Pane {
    pub scroll_offset: f64,
    pub scrollable_height: f64,
    pub viewport_height: f64,
    // Offset we set programmatically and expect to see echoed back
    echo: Option<f64>,
}

impl Pane {
    pub fn new(scrollable_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_offset: 0.0,
            scrollable_height,
            viewport_height,
            echo: None,
        }
    }

    fn max_offset(&self) -> f64 {
        (self.scrollable_height - self.viewport_height).max(0.0)
    }

    /// Relative position in `[0, 1]`; content that fits the viewport is at 0
    pub fn scroll_percentage(&self) -> f64 {
        let max = self.max_offset();
        if max <= 0.0 {
            return 0.0;
        }
        (self.scroll_offset / max).clamp(0.0, 1.0)
    }

    /// Move to `percentage` of the scrollable range. Returns whether the
    /// offset changed; an unchanged pane raises no scroll event to echo.
    fn apply_percentage(&mut self, percentage: f64) -> bool {
        let offset = percentage * self.max_offset();
        if offset == self.scroll_offset {
            return false;
        }
        self.scroll_offset = offset;
        self.echo = Some(offset);
        true
    }
}

/// Single-slot mailbox: publishing overwrites any value not yet taken
#[derive(Debug, Clone, Default)]
pub struct ScrollChannel {
    slot: Option<f64>,
}

impl ScrollChannel {
    pub fn publish(&mut self, scroll_percentage: f64) {
        self.slot = Some(scroll_percentage);
    }

    pub fn take(&mut self) -> Option<f64> {
        self.slot.take()
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

const ECHO_TOLERANCE: f64 = 0.5;

/// Mirrors the scroll position of the editor and preview panes.
///
/// A user scroll publishes a percentage on the channel for its direction;
/// [`ScrollSync::deliver`] applies pending percentages to the opposite pane.
/// Applied offsets are never republished, and the scroll event the host
/// raises for an applied offset is swallowed, so the panes cannot feed back
/// into each other.
#[derive(Debug, Clone)]
pub struct ScrollSync {
    enabled: bool,
    editor: Pane,
    preview: Pane,
    editor_to_preview: ScrollChannel,
    preview_to_editor: ScrollChannel,
}

impl ScrollSync {
    pub fn new(enabled: bool, editor: Pane, preview: Pane) -> Self {
        Self {
            enabled,
            editor,
            preview,
            editor_to_preview: ScrollChannel::default(),
            preview_to_editor: ScrollChannel::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.editor_to_preview.clear();
            self.preview_to_editor.clear();
            self.editor.echo = None;
            self.preview.echo = None;
        }
    }

    pub fn pane(&self, id: PaneId) -> &Pane {
        match id {
            PaneId::Editor => &self.editor,
            PaneId::Preview => &self.preview,
        }
    }

    fn pane_mut(&mut self, id: PaneId) -> &mut Pane {
        match id {
            PaneId::Editor => &mut self.editor,
            PaneId::Preview => &mut self.preview,
        }
    }

    fn outbound(&mut self, source: PaneId) -> &mut ScrollChannel {
        match source {
            PaneId::Editor => &mut self.editor_to_preview,
            PaneId::Preview => &mut self.preview_to_editor,
        }
    }

    pub fn resize(&mut self, id: PaneId, scrollable_height: f64, viewport_height: f64) {
        let pane = self.pane_mut(id);
        pane.scrollable_height = scrollable_height;
        pane.viewport_height = viewport_height;
        pane.scroll_offset = pane.scroll_offset.min(pane.max_offset());
    }

    /// Host-reported scroll of pane `id` to `offset`. Returns whether a
    /// percentage was published.
    pub fn on_scroll(&mut self, id: PaneId, offset: f64) -> bool {
        let pane = self.pane_mut(id);
        pane.scroll_offset = offset;

        if let Some(expected) = pane.echo.take() {
            if (expected - offset).abs() <= ECHO_TOLERANCE {
                return false;
            }
        }

        if !self.enabled {
            return false;
        }

        let percentage = self.pane(id).scroll_percentage();
        self.outbound(id).publish(percentage);
        true
    }

    /// Apply pending percentages to their target panes. Returns the panes
    /// whose offset changed.
    pub fn deliver(&mut self) -> Vec<PaneId> {
        let mut moved = Vec::new();
        if !self.enabled {
            return moved;
        }

        for source in [PaneId::Editor, PaneId::Preview] {
            if let Some(percentage) = self.outbound(source).take() {
                let target = source.other();
                if !self.pane_mut(target).apply_percentage(percentage) {
                    continue;
                }
                log::debug!(
                    "Scroll sync {:?} -> {:?} at {:.3}",
                    source,
                    target,
                    percentage
                );
                moved.push(target);
            }
        }
        moved
    }

    pub fn has_pending(&self) -> bool {
        self.editor_to_preview.is_pending() || self.preview_to_editor.is_pending()
    }
}
