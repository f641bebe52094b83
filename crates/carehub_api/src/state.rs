use std::sync::{Arc, Mutex};

use carehub_core::db::{
    check_connection, open_index, open_index_in_memory, open_store, open_store_in_memory,
};
use carehub_core::{
    Entity, EntityService, ServiceError, ServiceResult, SqliteDocumentRepository,
    SqliteSearchRepository,
};
use rusqlite::Connection;

use super::{config::Config, error::AppError};

/// Entity service bound to the SQLite store and index connections.
pub type SqliteEntityService<'c, E> =
    EntityService<E, SqliteDocumentRepository<'c, E>, SqliteSearchRepository<'c, E>>;

/// Shared handles to the document store and the search index.
///
/// Each connection sits behind its own mutex. Callers always lock the store
/// first, then the index.
#[derive(Clone)]
pub struct AppState {
    stores: Arc<Stores>,
}

struct Stores {
    store: Mutex<Connection>,
    index: Mutex<Connection>,
}

impl AppState {
    pub fn new(store: Connection, index: Connection) -> Self {
        Self {
            stores: Arc::new(Stores {
                store: Mutex::new(store),
                index: Mutex::new(index),
            }),
        }
    }

    pub fn open(config: &Config) -> Result<Self, AppError> {
        let store = open_store(&config.store_path)?;
        let index = open_index(&config.index_path)?;
        Ok(Self::new(store, index))
    }

    pub fn in_memory() -> Result<Self, AppError> {
        Ok(Self::new(open_store_in_memory()?, open_index_in_memory()?))
    }

    /// Runs `f` against the entity service for `E` on the blocking pool.
    pub async fn with_service<E, T, F>(&self, f: F) -> Result<T, AppError>
    where
        E: Entity,
        T: Send + 'static,
        F: for<'c> FnOnce(&SqliteEntityService<'c, E>) -> ServiceResult<T> + Send + 'static,
    {
        let stores = Arc::clone(&self.stores);
        tokio::task::spawn_blocking(move || {
            let store = stores
                .store
                .lock()
                .map_err(|_| AppError::Internal("document store lock poisoned".to_string()))?;
            let index = stores
                .index
                .lock()
                .map_err(|_| AppError::Internal("search index lock poisoned".to_string()))?;

            let service = SqliteDocumentRepository::<E>::try_new(&store)
                .map_err(ServiceError::from)
                .and_then(|repo| {
                    let search =
                        SqliteSearchRepository::<E>::try_new(&index).map_err(ServiceError::from)?;
                    Ok(EntityService::new(repo, search))
                })
                .map_err(|err| AppError::from_service(err, E::ENTITY_NAME))?;

            f(&service).map_err(|err| AppError::from_service(err, E::ENTITY_NAME))
        })
        .await
        .map_err(|err| AppError::Internal(format!("blocking task failed: {err}")))?
    }

    /// Checks that both databases answer a trivial query.
    pub async fn check(&self) -> Result<(), AppError> {
        let stores = Arc::clone(&self.stores);
        tokio::task::spawn_blocking(move || {
            let store = stores
                .store
                .lock()
                .map_err(|_| AppError::Internal("document store lock poisoned".to_string()))?;
            check_connection(&store)?;
            drop(store);

            let index = stores
                .index
                .lock()
                .map_err(|_| AppError::Internal("search index lock poisoned".to_string()))?;
            check_connection(&index)?;
            Ok(())
        })
        .await
        .map_err(|err| AppError::Internal(format!("blocking task failed: {err}")))?
    }
}
