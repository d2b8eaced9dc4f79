//! Resolves which school a caller acts on behalf of.

use anyhow::anyhow;
use mamnon_core::AppError;
use mamnon_models::ids::{SchoolId, UserId};

use crate::store::{SchoolStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    #[error("User not found")]
    UserNotFound,

    #[error("User is not attached to a school")]
    UserWithoutSchool,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ScopeError> for AppError {
    fn from(err: ScopeError) -> Self {
        match err {
            ScopeError::UserNotFound => AppError::not_found(anyhow!("{}", err)),
            ScopeError::UserWithoutSchool => AppError::forbidden(anyhow!("{}", err)),
            ScopeError::Store(err) => err.into(),
        }
    }
}

/// The school of an existing, non-deleted caller.
pub async fn school_of(store: &dyn SchoolStore, caller: UserId) -> Result<SchoolId, ScopeError> {
    let user = store
        .find_user(caller)
        .await?
        .ok_or(ScopeError::UserNotFound)?;
    user.school_id.ok_or(ScopeError::UserWithoutSchool)
}
