//! research-core: shared pieces of the deep research tool
//!
//! # Modules
//!
//! - [`schema`]: request/response shapes and their validation
//! - [`history`]: persisted, deduplicated search history
//! - [`render`]: HTML and timestamp formatting for display
//!
//! # Example
//!
//! ```
//! use research_core::history::{HistoryStore, MemoryStorage};
//! use research_core::schema::{validate_search_request, SearchResult};
//! use serde_json::json;
//!
//! let request = validate_search_request(&json!({ "query": "Quantum computing" })).unwrap();
//!
//! let mut history = HistoryStore::open(MemoryStorage::new());
//! history
//!     .add(&request.query, Some(vec![SearchResult::new("# Notes", "<h1>Notes</h1>")]))
//!     .unwrap();
//!
//! assert_eq!(history.entries()[0].query, "Quantum computing");
//! ```

pub mod history;
pub mod render;
pub mod schema;

pub use history::{HistoryEntry, HistoryStore};
pub use schema::{SearchRequest, SearchResponse, SearchResult, ValidationError};
