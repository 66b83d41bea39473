use crate::storage::{HISTORY_KEY, PersistentStore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of snapshots kept before the oldest is evicted
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Characters of the changed line shown in a summary
const SUMMARY_WIDTH: usize = 100;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("version {index} does not exist ({len} versions)")]
    OutOfRange { index: usize, len: usize },
    #[error("stored history is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("stored history timestamps are out of order at entry {index}")]
    OutOfOrder { index: usize },
}

/// A durable snapshot of the buffer. `timestamp` is milliseconds since the
/// Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub content: String,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    None,
    Added,
    Removed,
    Modified,
}

impl ChangeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChangeKind::None => "none",
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSummary {
    pub kind: ChangeKind,
    pub text: String,
}

/// One row of a history listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryListing {
    pub index: usize,
    pub timestamp: u64,
    pub is_current: bool,
    pub summary: DiffSummary,
}

/// Classify the first line that differs between `content` and `previous`.
///
/// This is a cheap positional comparison, not an LCS diff: lines are compared
/// index by index and the scan stops at the first mismatch. Inserting a line
/// near the top therefore reports the shifted line as modified.
pub fn diff_summary(content: &str, previous: Option<&str>) -> DiffSummary {
    let previous = previous.unwrap_or("");

    if content == previous {
        return DiffSummary {
            kind: ChangeKind::None,
            text: "No changes".to_string(),
        };
    }

    if previous.is_empty() {
        let first_line = content.split('\n').next().unwrap_or("");
        return DiffSummary {
            kind: ChangeKind::Added,
            text: truncate_summary(first_line),
        };
    }

    let current_lines: Vec<&str> = content.split('\n').collect();
    let previous_lines: Vec<&str> = previous.split('\n').collect();
    let line_count = current_lines.len().max(previous_lines.len());

    for i in 0..line_count {
        let current_line = current_lines.get(i).copied().unwrap_or("");
        let previous_line = previous_lines.get(i).copied().unwrap_or("");

        if current_line == previous_line {
            continue;
        }

        let (kind, text) = if previous_line.is_empty() {
            (ChangeKind::Added, current_line)
        } else if current_line.is_empty() {
            (ChangeKind::Removed, previous_line)
        } else {
            (ChangeKind::Modified, current_line)
        };
        return DiffSummary {
            kind,
            text: truncate_summary(text),
        };
    }

    // Only trailing empty lines differ
    DiffSummary {
        kind: ChangeKind::Modified,
        text: String::new(),
    }
}

fn truncate_summary(line: &str) -> String {
    let mut chars = line.chars();
    let head: String = chars.by_ref().take(SUMMARY_WIDTH).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Durable, timestamped snapshots of the buffer, capped at `limit` entries.
///
/// Snapshots are sampled: the owner calls [`VersionHistory::snapshot`] on a
/// timer and only the buffer state at that moment is captured.
#[derive(Debug, Clone)]
pub struct VersionHistory {
    entries: Vec<HistoryEntry>,
    current_index: Option<usize>,
    last_saved_content: String,
    limit: usize,
}

impl VersionHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            current_index: None,
            last_saved_content: String::new(),
            limit: limit.max(1),
        }
    }

    /// Load the persisted history. A payload that does not parse, or whose
    /// timestamps are not strictly increasing, is removed from the store and
    /// the history starts empty.
    pub fn load(store: &mut dyn PersistentStore, limit: usize) -> Self {
        let mut history = Self::new(limit);

        let Some(raw) = store.get(HISTORY_KEY) else {
            return history;
        };

        match Self::parse(&raw) {
            Ok(mut entries) => {
                // Honor a limit lowered since the history was written
                if entries.len() > history.limit {
                    entries.drain(..entries.len() - history.limit);
                }
                history.last_saved_content = entries
                    .last()
                    .map(|e| e.content.clone())
                    .unwrap_or_default();
                history.current_index = entries.len().checked_sub(1);
                history.entries = entries;
                log::debug!("Loaded {} history entries", history.entries.len());
            }
            Err(e) => {
                log::warn!("Discarding history: {e}");
                if let Err(e) = store.remove(HISTORY_KEY) {
                    log::warn!("Could not clear corrupt history: {e}");
                }
            }
        }

        history
    }

    fn parse(raw: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        let entries: Vec<HistoryEntry> = serde_json::from_str(raw)?;
        if let Some(index) = entries
            .windows(2)
            .position(|pair| pair[0].timestamp >= pair[1].timestamp)
        {
            return Err(HistoryError::OutOfOrder { index: index + 1 });
        }
        // Leave room for the next snapshot's timestamp
        if entries.last().is_some_and(|e| e.timestamp == u64::MAX) {
            return Err(HistoryError::OutOfOrder {
                index: entries.len() - 1,
            });
        }
        Ok(entries)
    }

    /// Seed the first entry with the first non-empty buffer seen
    pub fn seed(&mut self, content: &str, now: u64, store: &mut dyn PersistentStore) -> bool {
        if !self.entries.is_empty() || content.is_empty() {
            return false;
        }
        self.push(content, now, store);
        true
    }

    /// Append `content` if it differs from the last saved snapshot.
    /// Returns whether an entry was added.
    pub fn snapshot(&mut self, content: &str, now: u64, store: &mut dyn PersistentStore) -> bool {
        if content == self.last_saved_content {
            return false;
        }
        self.push(content, now, store);
        true
    }

    fn push(&mut self, content: &str, now: u64, store: &mut dyn PersistentStore) {
        // Keep timestamps strictly increasing even if the clock stalls or steps back
        let timestamp = match self.entries.last() {
            Some(last) if now <= last.timestamp => last.timestamp.saturating_add(1),
            _ => now,
        };

        self.entries.push(HistoryEntry {
            content: content.to_string(),
            timestamp,
        });
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }

        self.current_index = Some(self.entries.len() - 1);
        self.last_saved_content = content.to_string();
        log::debug!(
            "History snapshot at {} ({} entries)",
            timestamp,
            self.entries.len()
        );

        if let Err(e) = self.persist(store) {
            log::warn!("Could not persist history: {e}");
        }
    }

    fn persist(&self, store: &mut dyn PersistentStore) -> Result<(), crate::storage::StorageError> {
        let raw = serde_json::to_string(&self.entries)?;
        store.set(HISTORY_KEY, &raw)
    }

    /// Content of version `index`, marking it current. Out of range leaves
    /// the history untouched.
    pub fn go_to_version(&mut self, index: usize) -> Result<&str, HistoryError> {
        if index >= self.entries.len() {
            return Err(HistoryError::OutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        self.current_index = Some(index);
        Ok(&self.entries[index].content)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn listing(&self) -> Vec<HistoryListing> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let previous = index
                    .checked_sub(1)
                    .map(|i| self.entries[i].content.as_str());
                HistoryListing {
                    index,
                    timestamp: entry.timestamp,
                    is_current: self.current_index == Some(index),
                    summary: diff_summary(&entry.content, previous),
                }
            })
            .collect()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for VersionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
