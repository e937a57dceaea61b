//! Search history module
//!
//! Keeps a bounded, most-recent-first record of past queries behind a
//! swappable storage port:
//! - [`storage`]: the port plus file and in-memory adapters
//! - [`store`]: deduplication, capping and persistence rules

pub mod storage;
pub mod store;

pub use storage::{FileStorage, HistoryStorage, MemoryStorage, StorageError};
pub use store::{HistoryEntry, HistoryStore, MAX_HISTORY_ITEMS, STORAGE_KEY};
