//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract every entity goes through.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories never touch the search index.
//! - Repository APIs return semantic results (`Option`, `bool`) for absence
//!   and reserve errors for transport or decoding failures.

pub mod document_repo;
