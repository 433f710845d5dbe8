//! Store interfaces the identity resolver reads through.
//!
//! Absence is `Ok(None)`, never an error. `Err(_)` is reserved for backend
//! failures, which callers propagate unchanged.
use async_trait::async_trait;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::types::{AuthToken, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("store backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, user_id: i64) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    // Exact string match. When the backend holds duplicates, the first
    // record in the backend's own ordering wins.
    async fn find_by_token(&self, token: &str) -> Result<Option<AuthToken>, StoreError>;
}
