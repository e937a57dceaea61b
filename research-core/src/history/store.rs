//! Bounded, deduplicated search history

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::storage::{HistoryStorage, Result};
use crate::schema::SearchResponse;

/// Key the whole history is stored under
pub const STORAGE_KEY: &str = "deep-research-history";

/// Entries kept after each insertion
pub const MAX_HISTORY_ITEMS: usize = 50;

const ID_SUFFIX_LEN: usize = 9;

/// A completed search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub query: String,
    /// ISO-8601, UTC
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<SearchResponse>,
}

/// Most-recent-first list of past queries, flushed to storage on every mutation
pub struct HistoryStore<S: HistoryStorage> {
    storage: S,
    entries: Vec<HistoryEntry>,
}

impl<S: HistoryStorage> HistoryStore<S> {
    /// Hydrate from storage. Missing or corrupt data yields an empty history.
    pub fn open(storage: S) -> Self {
        let entries = read_entries(&storage);
        debug!("Loaded {} history entries", entries.len());
        Self { storage, entries }
    }

    /// Re-read the persisted history
    pub fn load(&self) -> Vec<HistoryEntry> {
        read_entries(&self.storage)
    }

    /// Current entries, most recent first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Record a completed search.
    ///
    /// An earlier entry with the exact same query is replaced, the new entry
    /// goes to the front, and anything past [`MAX_HISTORY_ITEMS`] is dropped.
    pub fn add(&mut self, query: &str, results: Option<SearchResponse>) -> Result<&HistoryEntry> {
        let entry = HistoryEntry {
            id: self.next_id(),
            query: query.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            results,
        };

        let mut updated = Vec::with_capacity(MAX_HISTORY_ITEMS);
        updated.push(entry);
        updated.extend(
            self.entries
                .iter()
                .filter(|existing| existing.query != query)
                .take(MAX_HISTORY_ITEMS - 1)
                .cloned(),
        );

        // Memory only changes once the new list is on disk
        write_entries(&self.storage, &updated)?;
        self.entries = updated;
        Ok(&self.entries[0])
    }

    /// Drop every entry and delete the persisted record
    pub fn clear(&mut self) -> Result<()> {
        self.storage.remove(STORAGE_KEY)?;
        self.entries.clear();
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    fn next_id(&self) -> String {
        loop {
            let id = generate_id();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

fn read_entries<S: HistoryStorage>(storage: &S) -> Vec<HistoryEntry> {
    let raw = match storage.load(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Failed to read search history, starting empty: {}", e);
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to parse search history, starting empty: {}", e);
            Vec::new()
        }
    }
}

fn write_entries<S: HistoryStorage>(storage: &S, entries: &[HistoryEntry]) -> Result<()> {
    let serialized = serde_json::to_string(entries)?;
    storage.save(STORAGE_KEY, &serialized)
}

/// `<unix millis>-<random base-36 suffix>`
fn generate_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut bits = Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(ID_SUFFIX_LEN);
    for _ in 0..ID_SUFFIX_LEN {
        suffix.push(ALPHABET[(bits % 36) as usize] as char);
        bits /= 36;
    }

    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::storage::{MemoryStorage, StorageError};
    use crate::schema::SearchResult;
    use std::cell::Cell;
    use std::collections::HashSet;
    use std::io;

    /// Wraps a memory store and fails writes once `broken` is set
    struct FlakyStorage {
        inner: MemoryStorage,
        broken: Cell<bool>,
    }

    impl FlakyStorage {
        fn check(&self) -> Result<()> {
            if self.broken.get() {
                return Err(StorageError::Io(io::Error::new(io::ErrorKind::Other, "disk full")));
            }
            Ok(())
        }
    }

    impl HistoryStorage for FlakyStorage {
        fn load(&self, key: &str) -> Result<Option<String>> {
            self.inner.load(key)
        }

        fn save(&self, key: &str, value: &str) -> Result<()> {
            self.check()?;
            self.inner.save(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.check()?;
            self.inner.remove(key)
        }
    }

    fn results(text: &str) -> SearchResponse {
        vec![SearchResult::new(text, format!("<p>{}</p>", text))]
    }

    #[test]
    fn test_add_then_load() {
        let mut store = HistoryStore::open(MemoryStorage::new());
        store.add("rust async", Some(results("a"))).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].query, "rust async");
        assert_eq!(loaded[0].results, Some(results("a")));
    }

    #[test]
    fn test_duplicate_query_moves_to_front() {
        let mut store = HistoryStore::open(MemoryStorage::new());
        store.add("first", None).unwrap();
        store.add("second", None).unwrap();
        store.add("first", Some(results("newer"))).unwrap();

        let queries: Vec<_> = store.entries().iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, vec!["first", "second"]);
        assert_eq!(store.entries()[0].results, Some(results("newer")));
    }

    #[test]
    fn test_dedup_is_case_sensitive() {
        let mut store = HistoryStore::open(MemoryStorage::new());
        store.add("Rust", None).unwrap();
        store.add("rust", None).unwrap();
        store.add("rust ", None).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut store = HistoryStore::open(MemoryStorage::new());
        for i in 0..=MAX_HISTORY_ITEMS {
            store.add(&format!("query {}", i), None).unwrap();
        }

        assert_eq!(store.len(), MAX_HISTORY_ITEMS);
        assert_eq!(store.entries()[0].query, format!("query {}", MAX_HISTORY_ITEMS));
        assert!(store.entries().iter().all(|e| e.query != "query 0"));
        assert_eq!(store.load().len(), MAX_HISTORY_ITEMS);
    }

    #[test]
    fn test_clear_removes_record() {
        let mut store = HistoryStore::open(MemoryStorage::new());
        store.add("something", None).unwrap();
        assert!(store.storage().contains(STORAGE_KEY));

        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(store.load().is_empty());
        assert!(!store.storage().contains(STORAGE_KEY));
    }

    #[test]
    fn test_corrupt_storage_starts_empty() {
        let store = HistoryStore::open(MemoryStorage::with_value(STORAGE_KEY, "{not json"));
        assert!(store.is_empty());

        let store = HistoryStore::open(MemoryStorage::with_value(STORAGE_KEY, r#"{"id":"x"}"#));
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_by_id() {
        let mut store = HistoryStore::open(MemoryStorage::new());
        let id = store.add("lookup", None).unwrap().id.clone();
        store.add("other", None).unwrap();

        assert_eq!(store.get(&id).map(|e| e.query.as_str()), Some("lookup"));
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut store = HistoryStore::open(MemoryStorage::new());
        for i in 0..MAX_HISTORY_ITEMS {
            store.add(&i.to_string(), None).unwrap();
        }
        let ids: HashSet<_> = store.entries().iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids.len(), MAX_HISTORY_ITEMS);
    }

    #[test]
    fn test_id_and_timestamp_format() {
        let id = generate_id();
        let (millis, suffix) = id.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), ID_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));

        let mut store = HistoryStore::open(MemoryStorage::new());
        let entry = store.add("when", None).unwrap();
        assert!(entry.timestamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&entry.timestamp).is_ok());
    }

    #[test]
    fn test_absent_results_not_serialized() {
        let mut store = HistoryStore::open(MemoryStorage::new());
        store.add("bare", None).unwrap();
        let raw = store.storage().load(STORAGE_KEY).unwrap().unwrap();
        assert!(!raw.contains("results"));
    }

    #[test]
    fn test_failed_write_leaves_history_untouched() {
        let storage = FlakyStorage {
            inner: MemoryStorage::new(),
            broken: Cell::new(false),
        };
        let mut store = HistoryStore::open(storage);
        store.add("kept", None).unwrap();
        store.add("also kept", None).unwrap();
        let before = store.entries().to_vec();

        store.storage().broken.set(true);
        assert!(matches!(store.add("kept", None), Err(StorageError::Io(_))));
        assert!(store.add("new query", None).is_err());
        assert_eq!(store.entries(), before.as_slice());
        assert_eq!(store.load(), before);

        assert!(store.clear().is_err());
        assert_eq!(store.entries(), before.as_slice());
        assert_eq!(store.load(), before);
    }
}
