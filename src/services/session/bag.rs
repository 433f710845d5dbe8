//! Key/value view of the per-client session.
//!
//! The auth layer only ever needs `get`/`set` of JSON values, so it talks to
//! this trait instead of `tower_sessions::Session` directly.
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tower_sessions::Session;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Session(#[from] tower_sessions::session::Error),

    #[error("session backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait SessionBag: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, SessionError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), SessionError>;
}

#[async_trait]
impl SessionBag for Session {
    async fn get(&self, key: &str) -> Result<Option<Value>, SessionError> {
        Ok(self.get_value(key).await?)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), SessionError> {
        self.insert_value(key, value).await?;
        Ok(())
    }
}
