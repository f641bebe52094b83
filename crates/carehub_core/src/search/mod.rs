//! Full-text search index.
//!
//! # Responsibility
//! - Expose index/search APIs backed by a separate SQLite FTS5 database.
//! - Keep query parsing and result shaping inside core.

pub mod fts;
pub mod index_repo;
