//! PostgreSQL-backed `UserStore` / `TokenStore`.
use async_trait::async_trait;
use sqlx::PgPool;

use crate::repos::{token_repo, user_repo};
use crate::services::auth::store::{StoreError, TokenStore, UserStore};
use crate::services::auth::types::{AuthToken, User};

#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_by_id(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        let row = user_repo::get(&self.pool, user_id).await?;

        Ok(row.map(|r| User {
            id: r.id,
            user_name: r.user_name,
            created_at: r.created_at,
        }))
    }
}

#[derive(Clone, Debug)]
pub struct PgTokenStore {
    pool: PgPool,
}

impl PgTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn find_by_token(&self, token: &str) -> Result<Option<AuthToken>, StoreError> {
        let row = token_repo::find_by_token(&self.pool, token).await?;

        Ok(row.map(|r| AuthToken {
            token: r.token,
            user: User {
                id: r.user_id,
                user_name: r.user_name,
                created_at: r.user_created_at,
            },
        }))
    }
}
