//! Valkey-backed `tower_sessions::SessionStore`.
//!
//! One JSON-encoded `Record` per key `<prefix>:<id>`. The key TTL follows the
//! record's expiry date, so Valkey drops sessions on its own.
use std::{fmt, time::Duration};

use async_trait::async_trait;
use tower_sessions::{
    SessionStore,
    cookie::time::OffsetDateTime,
    session::{Id, Record},
    session_store,
};

use crate::services::cache::{CacheClient, CacheError};

#[derive(Clone)]
pub struct ValkeySessionStore<C: CacheClient> {
    cache: C,
    prefix: String,
}

impl<C: CacheClient> ValkeySessionStore<C> {
    pub fn new(cache: C) -> Self {
        Self::new_with_prefix(cache, "session")
    }

    pub fn new_with_prefix(cache: C, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, id: &Id) -> String {
        format!("{}:{}", self.prefix, id)
    }
}

impl<C: CacheClient> fmt::Debug for ValkeySessionStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValkeySessionStore")
            .field("backend", &self.cache.backend_name())
            .field("prefix", &self.prefix)
            .finish()
    }
}

/// Time left until `expiry_date`; `None` once it has passed.
fn remaining_ttl(expiry_date: OffsetDateTime) -> Option<Duration> {
    let seconds = (expiry_date - OffsetDateTime::now_utc()).whole_seconds();
    u64::try_from(seconds)
        .ok()
        .filter(|s| *s > 0)
        .map(Duration::from_secs)
}

fn backend(e: CacheError) -> session_store::Error {
    session_store::Error::Backend(e.to_string())
}

fn encode(record: &Record) -> session_store::Result<String> {
    serde_json::to_string(record).map_err(|e| session_store::Error::Encode(e.to_string()))
}

#[async_trait]
impl<C: CacheClient> SessionStore for ValkeySessionStore<C> {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let Some(ttl) = remaining_ttl(record.expiry_date) else {
            return Ok(());
        };

        // SET NX so a colliding id never overwrites somebody else's session
        loop {
            let raw = encode(record)?;
            let stored = self
                .cache
                .set_if_absent_with_ttl(&self.key(&record.id), &raw, ttl)
                .await
                .map_err(backend)?;

            if stored {
                return Ok(());
            }
            tracing::debug!("session id collision; drawing a new id");
            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let key = self.key(&record.id);

        match remaining_ttl(record.expiry_date) {
            Some(ttl) => self
                .cache
                .set_with_ttl(&key, &encode(record)?, ttl)
                .await
                .map_err(backend),
            None => self.cache.del(&key).await.map(|_| ()).map_err(backend),
        }
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        let Some(raw) = self.cache.get_string(&self.key(id)).await.map_err(backend)? else {
            return Ok(None);
        };

        let record: Record = serde_json::from_str(&raw)
            .map_err(|e| session_store::Error::Decode(e.to_string()))?;

        Ok(remaining_ttl(record.expiry_date).map(|_| record))
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        self.cache.del(&self.key(id)).await.map_err(backend)?;
        Ok(())
    }
}
