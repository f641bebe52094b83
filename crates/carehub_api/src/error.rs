use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use carehub_core::db::DbError;
use carehub_core::{SearchError, ServiceError};
use log::error;
use serde::Serialize;
use thiserror::Error;

use crate::headers::failure_alert;

#[derive(Error, Debug)]
pub enum AppError {
    /// Validation failure surfaced to the client with an alert.
    #[error("{title}")]
    BadRequestAlert {
        title: String,
        entity_name: &'static str,
        error_key: &'static str,
    },

    #[error("{entity_name} not found")]
    NotFound { entity_name: &'static str },

    #[error("Storage bootstrap failed: {0}")]
    Bootstrap(#[from] DbError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Maps a service failure for `entity_name` onto its HTTP shape.
    pub fn from_service(err: ServiceError, entity_name: &'static str) -> Self {
        match err {
            ServiceError::IdExists { entity } => Self::BadRequestAlert {
                title: format!("A new {entity} cannot already have an ID"),
                entity_name: entity,
                error_key: "idexists",
            },
            ServiceError::IdNull { entity } => Self::BadRequestAlert {
                title: "Invalid id".to_string(),
                entity_name: entity,
                error_key: "idnull",
            },
            ServiceError::IdInvalid { entity, .. } => Self::BadRequestAlert {
                title: "Invalid ID".to_string(),
                entity_name: entity,
                error_key: "idinvalid",
            },
            ServiceError::IdNotFound { entity, .. } => Self::BadRequestAlert {
                title: "Entity not found".to_string(),
                entity_name: entity,
                error_key: "idnotfound",
            },
            ServiceError::Search(SearchError::InvalidQuery { query, .. }) => {
                Self::BadRequestAlert {
                    title: format!("Invalid search query `{query}`"),
                    entity_name,
                    error_key: "badquery",
                }
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Problem body returned for every error status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Problem {
    title: String,
    status: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_key: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequestAlert {
                title,
                entity_name,
                error_key,
            } => {
                let status = StatusCode::BAD_REQUEST;
                let body = Problem {
                    title,
                    status: status.as_u16(),
                    message: format!("error.{error_key}"),
                    entity_name: Some(entity_name),
                    error_key: Some(error_key),
                };
                (status, failure_alert(entity_name, error_key), Json(body)).into_response()
            }
            AppError::NotFound { entity_name } => {
                let status = StatusCode::NOT_FOUND;
                let body = Problem {
                    title: "Not Found".to_string(),
                    status: status.as_u16(),
                    message: "error.http.404".to_string(),
                    entity_name: Some(entity_name),
                    error_key: None,
                };
                (status, Json(body)).into_response()
            }
            other => {
                error!("event=rest_error module=api status=error error={other}");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = Problem {
                    title: "Internal Server Error".to_string(),
                    status: status.as_u16(),
                    message: "error.http.500".to_string(),
                    entity_name: None,
                    error_key: None,
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
