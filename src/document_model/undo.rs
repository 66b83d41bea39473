/// Linear undo/redo history over whole-buffer snapshots.
///
/// Both stacks keep the most recent snapshot at the end of the `Vec`.
/// Depth is unbounded; the manager lives for one editing session only.
#[derive(Debug, Clone)]
pub struct UndoManager {
    undo_stack: Vec<String>,
    redo_stack: Vec<String>,
    current_value: String,
}

impl UndoManager {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            current_value: initial.into(),
        }
    }

    pub fn current_value(&self) -> &str {
        &self.current_value
    }

    /// Commit `new_value`, pushing the previous value onto the undo stack.
    ///
    /// Recording the value that is already current is a no-op, so repeated
    /// identical commits do not leave empty undo steps behind. Returns whether
    /// anything was recorded.
    pub fn record(&mut self, new_value: impl Into<String>) -> bool {
        let new_value = new_value.into();
        if new_value == self.current_value {
            return false;
        }

        let previous = std::mem::replace(&mut self.current_value, new_value);
        self.undo_stack.push(previous);

        // A fresh edit invalidates everything that was undone
        self.redo_stack.clear();
        true
    }

    /// Re-seed the current value after an outside actor replaced the buffer.
    /// Neither stack is touched.
    pub fn resync(&mut self, external: impl Into<String>) {
        self.current_value = external.into();
    }

    pub fn undo(&mut self) -> Option<&str> {
        let previous = self.undo_stack.pop()?;
        let undone = std::mem::replace(&mut self.current_value, previous);
        self.redo_stack.push(undone);
        Some(&self.current_value)
    }

    pub fn redo(&mut self) -> Option<&str> {
        let next = self.redo_stack.pop()?;
        let redone = std::mem::replace(&mut self.current_value, next);
        self.undo_stack.push(redone);
        Some(&self.current_value)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(String::new())
    }
}
