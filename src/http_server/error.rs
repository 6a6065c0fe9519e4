use axum::{
    Json,
    extract::rejection::{FormRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::services::error::{Action, MutationError, ServiceError};

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Errors a handler can hand back to axum.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Query(#[from] ServiceError),
    #[error(transparent)]
    Mutation(#[from] MutationError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Query(err) => match err {
                ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
                ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
                ServiceError::Constraint(_) | ServiceError::Database(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Mutation(err) => match (&err.cause, err.action) {
                (ServiceError::NotFound { .. }, _) => StatusCode::NOT_FOUND,
                (ServiceError::Constraint(_), Action::Deleted) => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            },
        }
    }
}

// Tell axum how to convert `ApiError` into a response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Mutation(err) => tracing::warn!("{} ({})", err, err.cause),
            _ if status.is_server_error() => tracing::error!("{:?}", self),
            _ => tracing::debug!("{}", self),
        }

        // Internal failures are not echoed to the client
        let error = if status.is_server_error() {
            "Something went wrong".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

// Record ids are the only path parameters, so a malformed one names no page.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Path rejected: {}", rejection.body_text());
        ApiError::NotFound("Page".to_string())
    }
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("Page".to_string())
}
