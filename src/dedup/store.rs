// src/dedup/store.rs
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default location of the persisted history document.
pub const DEFAULT_STORE_PATH: &str = "state/content_history.json";

/// Last-seen bookkeeping for one fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryRecord {
    pub title: String,
    pub url: String,
    pub source: String,
    pub last_seen: DateTime<Utc>,
}

/// Durable fingerprint → record mapping, persisted as one JSON document.
///
/// The whole document is rewritten on every flush; there is no append log,
/// so a reader must treat any parse failure as an empty store. A single
/// process is assumed to hold the file at a time.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    records: HashMap<String, HistoryRecord>,
}

impl HistoryStore {
    /// Load the store from `path`. A missing or malformed document yields an
    /// empty store; this never fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let records = match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str::<HashMap<String, HistoryRecord>>(&s) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "history document unreadable, starting empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self { path, records }
    }

    /// Serialize the full mapping and overwrite the document.
    ///
    /// Errors are returned to the caller; the in-memory mapping stays the
    /// source of truth for the rest of the process either way.
    pub fn flush(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(&self.records).context("serializing history")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, fingerprint: &str) -> Option<&HistoryRecord> {
        self.records.get(fingerprint)
    }

    /// Write or overwrite the record under `fingerprint`.
    pub fn upsert(&mut self, fingerprint: String, record: HistoryRecord) {
        self.records.insert(fingerprint, record);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &HistoryRecord)> {
        self.records.iter()
    }

    /// Records whose `last_seen` falls inside the last `days` days.
    pub fn recent(
        &self,
        days: i64,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = (&String, &HistoryRecord)> {
        self.records
            .iter()
            .filter(move |(_, r)| is_within_window(r.last_seen, days, now))
    }

    /// Retention sweep: keep only records seen within the last `days` days,
    /// then persist the survivors. Returns (retained, removed).
    pub fn prune_older_than(&mut self, days: i64, now: DateTime<Utc>) -> (usize, usize) {
        let before = self.records.len();
        self.records
            .retain(|_, r| is_within_window(r.last_seen, days, now));
        let retained = self.records.len();
        let removed = before - retained;
        info!(retained, removed, days, "pruned content history");
        if let Err(e) = self.flush() {
            warn!(error = %e, "failed to persist pruned history");
        }
        (retained, removed)
    }
}

/// Strictly-inside check: a timestamp exactly `days` old is already outside.
pub fn is_within_window(last_seen: DateTime<Utc>, days: i64, now: DateTime<Utc>) -> bool {
    last_seen > now - Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, last_seen: DateTime<Utc>) -> HistoryRecord {
        HistoryRecord {
            title: title.to_string(),
            url: format!("https://example.test/{title}"),
            source: "Test".to_string(),
            last_seen,
        }
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("nope.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = HistoryStore::open(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn flush_then_open_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let now = Utc::now();

        let mut store = HistoryStore::open(&path);
        for i in 0..5 {
            store.upsert(format!("fp{i}"), record(&format!("title {i}"), now));
        }
        store.flush().unwrap();

        let reloaded = HistoryStore::open(&path);
        assert_eq!(reloaded.len(), 5);
        assert_eq!(reloaded.get("fp3").unwrap().title, "title 3");
        assert_eq!(reloaded.get("fp3").unwrap().last_seen, now);
    }

    #[test]
    fn prune_keeps_only_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let now = Utc::now();

        let mut store = HistoryStore::open(&path);
        store.upsert("old".into(), record("old", now - Duration::days(31)));
        store.upsert("edge".into(), record("edge", now - Duration::days(30)));
        store.upsert("fresh".into(), record("fresh", now - Duration::days(29)));

        let (retained, removed) = store.prune_older_than(30, now);
        assert_eq!((retained, removed), (1, 2));
        assert!(store.get("fresh").is_some());
        assert!(store.get("old").is_none());
        // exactly on the horizon counts as outside
        assert!(store.get("edge").is_none());

        // pruning persisted the survivors
        let reloaded = HistoryStore::open(&path);
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn window_check_boundaries() {
        let now = Utc::now();
        assert!(is_within_window(now - Duration::days(2), 3, now));
        assert!(!is_within_window(now - Duration::days(4), 3, now));
        assert!(!is_within_window(now - Duration::days(3), 3, now));
    }
}
