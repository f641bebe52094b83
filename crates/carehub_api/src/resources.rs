//! REST resources shared by every entity.
//!
//! Each entity mounts the same six routes under `/api/{collection}`; the
//! handlers are generic over `E: Entity` and only differ by type.

use axum::{
    extract::{Path, Query, State},
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use carehub_core::{
    Address, Condition, Entity, HcCredential, HcPayOption, ListQuery, Medication, Membership,
    Metadata, Profile, Report, SearchQuery, Stat, Task, Team,
};
use log::debug;
use serde::Deserialize;

use crate::{
    error::AppError,
    headers::{entity_created_alert, entity_deleted_alert, entity_updated_alert, total_count},
    state::AppState,
};

/// Optional pagination. Without `size` every record is returned.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl PageParams {
    /// Returns `(limit, offset)` when the caller asked for a page.
    fn window(&self) -> Option<(u32, u32)> {
        let size = self.size?;
        let offset = self.page.unwrap_or(0).saturating_mul(size);
        Some((size, offset))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    pub page: Option<u32>,
    pub size: Option<u32>,
    /// Passes `query` to FTS5 unescaped; bad syntax is answered with 400.
    #[serde(default)]
    pub raw: bool,
}

/// Mounts the CRUD and search routes of every entity.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(entity_routes::<Address>())
        .merge(entity_routes::<Condition>())
        .merge(entity_routes::<HcCredential>())
        .merge(entity_routes::<HcPayOption>())
        .merge(entity_routes::<Medication>())
        .merge(entity_routes::<Membership>())
        .merge(entity_routes::<Metadata>())
        .merge(entity_routes::<Profile>())
        .merge(entity_routes::<Report>())
        .merge(entity_routes::<Stat>())
        .merge(entity_routes::<Task>())
        .merge(entity_routes::<Team>())
}

pub fn entity_routes<E: Entity>() -> Router<AppState> {
    let base = format!("/api/{}", E::COLLECTION);

    Router::new()
        .route(&base, get(list_entities::<E>).post(create_entity::<E>))
        // Static segments win over `{id}`, so `_search` only answers GET.
        .route(&format!("{base}/_search"), get(search_entities::<E>))
        .route(
            &format!("{base}/{{id}}"),
            get(get_entity::<E>)
                .put(update_entity::<E>)
                .patch(partial_update_entity::<E>)
                .delete(delete_entity::<E>),
        )
}

pub async fn create_entity<E: Entity>(
    State(state): State<AppState>,
    Json(entity): Json<E>,
) -> Result<Response, AppError> {
    debug!("event=rest_request module=api op=create entity={}", E::ENTITY_NAME);
    let created = state
        .with_service::<E, _, _>(move |service| service.create(entity))
        .await?;

    let id = created.id().unwrap_or_default().to_string();
    let mut headers = entity_created_alert(E::ENTITY_NAME, &id);
    if let Ok(location) = HeaderValue::from_str(&format!("/api/{}/{}", E::COLLECTION, id)) {
        headers.insert(LOCATION, location);
    }

    Ok((StatusCode::CREATED, headers, Json(created)).into_response())
}

pub async fn update_entity<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(entity): Json<E>,
) -> Result<Response, AppError> {
    debug!("event=rest_request module=api op=update entity={} id={}", E::ENTITY_NAME, id);
    let path_id = id.clone();
    let updated = state
        .with_service::<E, _, _>(move |service| service.update(&path_id, entity))
        .await?;

    Ok((entity_updated_alert(E::ENTITY_NAME, &id), Json(updated)).into_response())
}

/// Accepts `application/json` and `application/merge-patch+json` bodies.
pub async fn partial_update_entity<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<E>,
) -> Result<Response, AppError> {
    debug!(
        "event=rest_request module=api op=partial_update entity={} id={}",
        E::ENTITY_NAME,
        id
    );
    let path_id = id.clone();
    let patched = state
        .with_service::<E, _, _>(move |service| service.partial_update(&path_id, patch))
        .await?
        .ok_or(AppError::NotFound {
            entity_name: E::ENTITY_NAME,
        })?;

    Ok((entity_updated_alert(E::ENTITY_NAME, &id), Json(patched)).into_response())
}

pub async fn list_entities<E: Entity>(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Response, AppError> {
    debug!("event=rest_request module=api op=list entity={}", E::ENTITY_NAME);
    let window = params.window();
    let (items, total) = state
        .with_service::<E, _, _>(move |service| {
            let query = match window {
                Some((limit, offset)) => ListQuery {
                    limit: Some(limit),
                    offset,
                },
                None => ListQuery::default(),
            };
            let items = service.find_all(&query)?;
            let total = match window {
                Some(_) => Some(service.count()?),
                None => None,
            };
            Ok((items, total))
        })
        .await?;

    match total {
        Some(total) => Ok((total_count(total), Json(items)).into_response()),
        None => Ok(Json(items).into_response()),
    }
}

pub async fn get_entity<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<E>, AppError> {
    debug!("event=rest_request module=api op=get entity={} id={}", E::ENTITY_NAME, id);
    state
        .with_service::<E, _, _>(move |service| service.find_one(&id))
        .await?
        .map(Json)
        .ok_or(AppError::NotFound {
            entity_name: E::ENTITY_NAME,
        })
}

pub async fn delete_entity<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    debug!("event=rest_request module=api op=delete entity={} id={}", E::ENTITY_NAME, id);
    let path_id = id.clone();
    state
        .with_service::<E, _, _>(move |service| service.delete(&path_id))
        .await?;

    Ok((StatusCode::NO_CONTENT, entity_deleted_alert(E::ENTITY_NAME, &id)).into_response())
}

pub async fn search_entities<E: Entity>(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<E>>, AppError> {
    debug!(
        "event=rest_request module=api op=search entity={} query_len={}",
        E::ENTITY_NAME,
        params.query.len()
    );
    let window = PageParams {
        page: params.page,
        size: params.size,
    }
    .window();
    let mut query = SearchQuery::new(params.query);
    query.raw_fts_syntax = params.raw;
    if let Some((limit, offset)) = window {
        query.limit = Some(limit);
        query.offset = offset;
    }

    let hits = state
        .with_service::<E, _, _>(move |service| service.search(&query))
        .await?;
    Ok(Json(hits))
}
