use crate::error::Result;
use crate::types::Outcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Entries kept on disk; older ones are dropped first.
pub const HISTORY_LIMIT: usize = 100;

/// One processed event as it is remembered in the history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub pattern: String,
    pub templates: Vec<String>,
    pub outcome: Outcome,
    /// Documentation files written successfully.
    pub updates: usize,
    #[serde(default)]
    pub files_failed: usize,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub error_count: usize,
}

/// Bounded log of recent events backed by a JSON array file.
///
/// Unlike the counters, the log is disposable: a file that does not parse is
/// reported and replaced.
#[derive(Debug)]
pub struct History {
    path: PathBuf,
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::load(&path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %path.display(), "discarding unreadable history: {e}");
                VecDeque::new()
            }
        };
        Self { path, entries }
    }

    fn load(path: &Path) -> Result<VecDeque<HistoryEntry>> {
        if !path.exists() {
            return Ok(VecDeque::new());
        }
        let data = std::fs::read_to_string(path)?;
        let mut entries: VecDeque<HistoryEntry> = serde_json::from_str(&data)?;
        while entries.len() > HISTORY_LIMIT {
            entries.pop_front();
        }
        Ok(entries)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append `entry`, evict past the limit, then save the whole log.
    ///
    /// The entry stays in memory when the save fails.
    pub fn push(&mut self, entry: HistoryEntry) -> Result<()> {
        self.entries.push_back(entry);
        while self.entries.len() > HISTORY_LIMIT {
            self.entries.pop_front();
        }
        let data = serde_json::to_string_pretty(&self.entries)?;
        crate::io::atomic_write(&self.path, data.as_bytes())
    }

    /// The newest `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<HistoryEntry> {
        self.entries.iter().rev().take(n).cloned().collect()
    }
}
