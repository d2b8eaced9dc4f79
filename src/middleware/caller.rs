use anyhow::anyhow;
use axum::{extract::FromRequestParts, http::request::Parts};
use mamnon_core::AppError;
use mamnon_models::ids::UserId;

/// Header the upstream gateway sets to the authenticated user's id.
pub const CALLER_HEADER: &str = "x-user-id";

/// Extractor for the id of the user making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub UserId);

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(CALLER_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized(anyhow!("Missing X-User-Id header")))?;

        let id = value
            .trim()
            .parse::<UserId>()
            .map_err(|_| AppError::unauthorized(anyhow!("Invalid X-User-Id header")))?;

        Ok(CallerId(id))
    }
}
