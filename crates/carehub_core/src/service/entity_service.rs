//! Entity use-case service.
//!
//! # Responsibility
//! - Enforce identifier rules for create/update/partial update.
//! - Write through to the document store, then mirror into the search index.
//!
//! # Invariants
//! - Create rejects a preset id; update and patch require an id that matches
//!   the path and exists in the store.
//! - The store write always precedes the index write.
//! - A failed index write is reported but never rolled back or retried.

use crate::model::Entity;
use crate::repo::document_repo::{DocumentRepository, ListQuery, RepoError};
use crate::search::fts::{SearchError, SearchQuery};
use crate::search::index_repo::SearchRepository;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for entity use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Create was called with an id already set.
    IdExists { entity: &'static str },
    /// Update/patch payload has no id.
    IdNull { entity: &'static str },
    /// Payload id differs from the path id.
    IdInvalid {
        entity: &'static str,
        path_id: String,
        body_id: String,
    },
    /// Update/patch target is unknown to the store.
    IdNotFound { entity: &'static str, id: String },
    Repo(RepoError),
    Search(SearchError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IdExists { entity } => write!(f, "a new {entity} cannot already have an id"),
            Self::IdNull { entity } => write!(f, "{entity} id is missing"),
            Self::IdInvalid {
                entity,
                path_id,
                body_id,
            } => write!(f, "{entity} id `{body_id}` does not match path id `{path_id}`"),
            Self::IdNotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Search(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Search(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<SearchError> for ServiceError {
    fn from(value: SearchError) -> Self {
        Self::Search(value)
    }
}

/// Use-case service wrapping one entity's store and index repositories.
pub struct EntityService<E, R, S> {
    repo: R,
    search: S,
    _entity: PhantomData<fn() -> E>,
}

impl<E, R, S> EntityService<E, R, S>
where
    E: Entity,
    R: DocumentRepository<E>,
    S: SearchRepository<E>,
{
    pub fn new(repo: R, search: S) -> Self {
        Self {
            repo,
            search,
            _entity: PhantomData,
        }
    }

    /// Creates a new record with a generated id.
    ///
    /// # Errors
    /// - `IdExists` when `entity` already carries an id.
    pub fn create(&self, mut entity: E) -> ServiceResult<E> {
        if entity.id().is_some() {
            return Err(ServiceError::IdExists {
                entity: E::ENTITY_NAME,
            });
        }

        entity.set_id(Uuid::new_v4().to_string());
        self.write_through(&entity, "create")?;
        Ok(entity)
    }

    /// Fully replaces the record at `path_id`.
    pub fn update(&self, path_id: &str, entity: E) -> ServiceResult<E> {
        self.check_update_target(path_id, &entity)?;
        self.write_through(&entity, "update")?;
        Ok(entity)
    }

    /// Applies the provided fields of `patch` onto the record at `path_id`.
    ///
    /// Returns `Ok(None)` when the record disappeared between the existence
    /// check and the load.
    pub fn partial_update(&self, path_id: &str, patch: E) -> ServiceResult<Option<E>> {
        self.check_update_target(path_id, &patch)?;

        let Some(mut existing) = self.repo.find_by_id(path_id)? else {
            return Ok(None);
        };
        existing.merge(patch);
        self.write_through(&existing, "partial_update")?;
        Ok(Some(existing))
    }

    pub fn find_all(&self, query: &ListQuery) -> ServiceResult<Vec<E>> {
        Ok(self.repo.find_all(query)?)
    }

    pub fn count(&self) -> ServiceResult<u64> {
        Ok(self.repo.count()?)
    }

    pub fn find_one(&self, id: &str) -> ServiceResult<Option<E>> {
        Ok(self.repo.find_by_id(id)?)
    }

    /// Deletes from the store, then from the index. Unknown ids are a no-op.
    pub fn delete(&self, id: &str) -> ServiceResult<()> {
        let existed = self.repo.delete_by_id(id)?;
        if let Err(err) = self.search.remove(id) {
            error!(
                "event=index_write module=service status=error op=delete entity={} id={} error={}",
                E::ENTITY_NAME,
                id,
                err
            );
            return Err(err.into());
        }
        info!(
            "event=entity_delete module=service status=ok entity={} id={} existed={}",
            E::ENTITY_NAME,
            id,
            existed
        );
        Ok(())
    }

    pub fn search(&self, query: &SearchQuery) -> ServiceResult<Vec<E>> {
        Ok(self.search.search(query)?)
    }

    fn check_update_target(&self, path_id: &str, entity: &E) -> ServiceResult<()> {
        let Some(body_id) = entity.id() else {
            return Err(ServiceError::IdNull {
                entity: E::ENTITY_NAME,
            });
        };

        if body_id != path_id {
            return Err(ServiceError::IdInvalid {
                entity: E::ENTITY_NAME,
                path_id: path_id.to_string(),
                body_id: body_id.to_string(),
            });
        }

        if !self.repo.exists_by_id(path_id)? {
            return Err(ServiceError::IdNotFound {
                entity: E::ENTITY_NAME,
                id: path_id.to_string(),
            });
        }

        Ok(())
    }

    fn write_through(&self, entity: &E, op: &'static str) -> ServiceResult<()> {
        self.repo.save(entity)?;

        // The store write stays in place even if indexing fails.
        if let Err(err) = self.search.index(entity) {
            error!(
                "event=index_write module=service status=error op={} entity={} id={} error={}",
                op,
                E::ENTITY_NAME,
                entity.id().unwrap_or_default(),
                err
            );
            return Err(err.into());
        }

        info!(
            "event=entity_write module=service status=ok op={} entity={} id={}",
            op,
            E::ENTITY_NAME,
            entity.id().unwrap_or_default()
        );
        Ok(())
    }
}
