//! Rolling history of results
//!
//! Most recent entry first, capped at a fixed length. Multi-line narratives
//! are split into a summary line and detail lines for display.

use std::collections::VecDeque;

use chrono::{DateTime, Local, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

/// Default number of entries kept
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// A single history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    /// Local wall-clock time, 24-hour "HH:MM:SS"
    pub timestamp: String,
    /// First line of the narrative
    pub summary: String,
    /// Remaining lines, if any
    pub details: Vec<String>,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time
    pub fn new(text: &str) -> Self {
        let mut lines = text.lines().map(str::to_string);
        let summary = lines.next().unwrap_or_default();
        let details = lines.collect();

        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            summary,
            details,
        }
    }
}

/// Bounded, thread-safe roll history
#[derive(Debug)]
pub struct RollHistory {
    limit: usize,
    entries: Mutex<VecDeque<HistoryEntry>>,
}

impl Default for RollHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl RollHistory {
    /// Create a history holding at most `limit` entries (minimum 1)
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            limit,
            entries: Mutex::new(VecDeque::with_capacity(limit)),
        }
    }

    /// Record a narrative, evicting the oldest entry when full
    pub fn push(&self, text: &str) -> HistoryEntry {
        let entry = HistoryEntry::new(text);
        let mut entries = self.entries.lock();
        entries.push_front(entry.clone());
        entries.truncate(self.limit);
        entry
    }

    /// Snapshot of all entries, most recent first
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
