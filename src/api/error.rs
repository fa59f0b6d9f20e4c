use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::RosterError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ValidationError(String),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),

    Forbidden(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<RosterError> for ApiError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::NotAuthenticated | RosterError::InvalidCredentials => {
                Self::Unauthorized(err.to_string())
            }
            RosterError::NotAuthorized(msg) => Self::Forbidden(msg),
            RosterError::Validation(msg) => Self::ValidationError(msg),
            RosterError::Conflict(msg) => Self::Conflict(msg),
            RosterError::NotFound(msg) => Self::NotFound(msg),
            RosterError::Database(msg) => Self::DatabaseError(msg),
            RosterError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    pub fn unauthenticated() -> Self {
        Self::Unauthorized(RosterError::NotAuthenticated.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: RosterError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn roster_errors_map_to_statuses() {
        assert_eq!(status_of(RosterError::NotAuthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(RosterError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(RosterError::not_authorized("no")),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(RosterError::validation("bad")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(RosterError::conflict("taken")), StatusCode::CONFLICT);
        assert_eq!(status_of(RosterError::not_found("gone")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(RosterError::Database("locked".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(RosterError::Internal("oops".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
