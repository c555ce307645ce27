use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contracts::domain::common::TransitionError;
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// Errors returned by services and turned into HTTP responses by handlers
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("{0}")]
    InvalidState(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ServiceError::NotFound { .. } => "not_found",
            ServiceError::ValidationFailed { .. } => "validation_failed",
            ServiceError::InvalidState(_) => "invalid_state",
            ServiceError::Unauthorized => "unauthorized",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::Database(_) | ServiceError::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            ServiceError::InvalidState(_) => StatusCode::CONFLICT,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Database(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<TransitionError> for ServiceError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::CompletionRequiresAction => {
                ServiceError::validation("durum", err.to_string())
            }
            TransitionError::AlreadyCompleted | TransitionError::CancelledCannotComplete => {
                ServiceError::InvalidState(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::validation("body", rejection.body_text())
    }
}

impl From<QueryRejection> for ServiceError {
    fn from(rejection: QueryRejection) -> Self {
        ServiceError::validation("query", rejection.body_text())
    }
}

impl From<PathRejection> for ServiceError {
    fn from(rejection: PathRejection) -> Self {
        ServiceError::validation("id", rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ServiceError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "internal database error".to_string()
            }
            ServiceError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let field = match &self {
            ServiceError::ValidationFailed { field, .. } => Some(field.clone()),
            _ => None,
        };

        let body = ErrorBody {
            error: self.kind(),
            message,
            field,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(
            ServiceError::not_found("a001_work_order", 7).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::validation("kar", "derived").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InvalidState("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ServiceError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ServiceError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::Database(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn transition_errors_split_into_validation_and_state() {
        match ServiceError::from(TransitionError::CompletionRequiresAction) {
            ServiceError::ValidationFailed { field, .. } => assert_eq!(field, "durum"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            ServiceError::from(TransitionError::CancelledCannotComplete),
            ServiceError::InvalidState(_)
        ));
    }

    #[tokio::test]
    async fn validation_body_names_the_field() {
        let response = ServiceError::validation("kar", "computed by the server").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "validation_failed");
        assert_eq!(body["field"], "kar");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let response = ServiceError::Database(DbErr::Custom("secret path".into())).into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal");
        assert!(body.get("field").is_none());
        assert!(!body["message"].as_str().unwrap().contains("secret"));
    }
}
