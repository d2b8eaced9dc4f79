//! Application error type with HTTP response conversion.
//!
//! Every failure that leaves a service is an [`AppError`]: an HTTP status plus
//! a human-readable message. Domain crates map their own typed errors onto one
//! of the constructors below; anything untyped (database driver errors, ad-hoc
//! `anyhow` errors) is folded into [`ErrorKind::Internal`] with the original
//! message appended.

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Stable error category exposed to API clients alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Conflict,
    BadRequest,
    Unauthorized,
    Unprocessable,
    Internal,
}

impl ErrorKind {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::FORBIDDEN => Self::Forbidden,
            StatusCode::CONFLICT => Self::Conflict,
            StatusCode::BAD_REQUEST => Self::BadRequest,
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::UNPROCESSABLE_ENTITY => Self::Unprocessable,
            _ => Self::Internal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Conflict => "conflict",
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Unprocessable => "unprocessable",
            Self::Internal => "internal",
        }
    }
}

/// Body rendered for every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    /// Wraps an unexpected failure, keeping only its message.
    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        let err: Error = err.into();
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            anyhow::anyhow!("Internal server error: {}", err),
        )
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn forbidden<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::FORBIDDEN, err)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::CONFLICT, err)
    }

    pub fn unauthorized<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNAUTHORIZED, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_status(self.status)
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.error, self.status)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = %self.error, "Request failed with internal error");
        }

        let body = Json(json!({
            "error": self.error.to_string(),
            "kind": self.kind(),
        }));

        (self.status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::internal(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .keys()
            .map(|field| format!("{} is invalid", field))
            .collect::<Vec<_>>()
            .join(", ");
        AppError::unprocessable(anyhow::anyhow!(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_status() {
        assert_eq!(
            AppError::not_found(anyhow::anyhow!("x")).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            AppError::forbidden(anyhow::anyhow!("x")).kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(
            AppError::conflict(anyhow::anyhow!("x")).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            AppError::bad_request(anyhow::anyhow!("x")).kind(),
            ErrorKind::BadRequest
        );
    }

    #[test]
    fn test_internal_appends_original_message() {
        let err = AppError::internal(anyhow::anyhow!("connection reset"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.message(), "Internal server error: connection reset");
    }

    #[test]
    fn test_sqlx_error_becomes_internal() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.message().starts_with("Internal server error: "));
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::BadRequest).unwrap();
        assert_eq!(json, r#""bad_request""#);
        assert_eq!(ErrorKind::NotFound.as_str(), "not_found");
    }
}
