//! Core domain logic for carehub.
//! This crate is the single source of truth for the CRUD contract shared by
//! every entity: identifier rules, store writes and index mirroring.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{
    Address, Condition, Entity, HcCredential, HcPayOption, Medication, Membership, Metadata,
    Profile, Report, Stat, Task, Team,
};
pub use repo::document_repo::{
    DocumentRepository, ListQuery, RepoError, RepoResult, SqliteDocumentRepository,
};
pub use search::fts::{SearchError, SearchQuery, SearchResult};
pub use search::index_repo::{SearchRepository, SqliteSearchRepository};
pub use service::entity_service::{EntityService, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
