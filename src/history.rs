use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::models::{Activity, InspirationResult, Quote};

pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub activity: Option<Activity>,
    pub advice: Option<String>,
    pub quote: Option<Quote>,
    pub timestamp: String,
}

impl HistoryEntry {
    pub fn from_result(result: &InspirationResult, timestamp: impl Into<String>) -> Self {
        Self {
            activity: result.activity.clone(),
            advice: result.advice.clone(),
            quote: result.quote.clone(),
            timestamp: timestamp.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Past results, newest first, never longer than [`HISTORY_LIMIT`].
///
/// Persisted as a JSON array, the same layout the browser keeps in local
/// storage. Nothing touches disk except [`History::load`] and [`History::save`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(HISTORY_LIMIT);
        Self { entries }
    }

    /// Inserts at the front, evicting the oldest entry when full.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn record(&mut self, result: &InspirationResult) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.push(HistoryEntry::from_result(result, timestamp));
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A missing file is an empty history. An unreadable one is logged and
    /// also treated as empty, so one bad write never locks the user out.
    pub fn load(path: &Path) -> Result<Self, HistoryError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(entries) => Ok(Self::from_entries(entries)),
            Err(e) => {
                warn!("Ignoring corrupt history file {}: {}", path.display(), e);
                Ok(Self::new())
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), HistoryError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry {
            activity: None,
            advice: Some(format!("advice #{}", n)),
            quote: Some(Quote {
                text: format!("quote #{}", n),
                author: "Anon".to_string(),
            }),
            timestamp: format!("2026-10-16 12:00:{:02}", n),
        }
    }

    #[test]
    fn test_push_keeps_ten_most_recent_first() {
        let mut history = History::new();
        for n in 1..=13 {
            history.push(entry(n));
        }

        assert_eq!(history.len(), HISTORY_LIMIT);
        let advice: Vec<&str> = history
            .entries()
            .iter()
            .map(|e| e.advice.as_deref().unwrap())
            .collect();
        let expected: Vec<String> = (4..=13).rev().map(|n| format!("advice #{}", n)).collect();
        assert_eq!(advice, expected);
    }

    #[test]
    fn test_from_entries_truncates() {
        let history = History::from_entries((0..15).map(entry).collect());
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.entries()[0], entry(0));
    }

    #[test]
    fn test_record_snapshots_result() {
        let result = InspirationResult::from_parts(
            Err("Failed to fetch activity.".to_string()),
            Ok("Be kind.".to_string()),
            Err("Failed to fetch motivational quote.".to_string()),
        );
        let mut history = History::new();
        history.record(&result);

        let recorded = &history.entries()[0];
        assert!(recorded.activity.is_none());
        assert_eq!(recorded.advice.as_deref(), Some("Be kind."));
        assert!(!recorded.timestamp.is_empty());
    }

    #[test]
    fn test_save_then_load_is_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("history.json");

        let mut history = History::new();
        for n in 0..12 {
            history.push(entry(n));
        }
        history.save(&path).unwrap();

        assert_eq!(History::load(&path).unwrap(), history);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let history = History::load(&dir.path().join("absent.json")).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").unwrap();

        assert!(History::load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_serialized_as_plain_array() {
        let mut history = History::new();
        history.push(entry(1));
        let value = serde_json::to_value(&history).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["timestamp"], "2026-10-16 12:00:01");
    }
}
