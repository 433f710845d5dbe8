#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use axum::Router;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use token_auth::middleware::http::HttpSettings;
use token_auth::services::auth::{
    AuthToken, IdentityResolver, ResolverConfig, StoreError, TokenStore, User, UserStore,
};
use token_auth::services::session::{SessionBag, SessionError, SessionSettings, session_layer};
use token_auth::{AppState, build_router};
use tower_sessions::MemoryStore;
use tower_sessions::cookie::time::Duration;

pub const SESSION_COOKIE: &str = "session_id";
pub const REMEMBER_COOKIE: &str = "remember_token";

pub fn user(id: i64) -> User {
    User {
        id,
        user_name: format!("user{id}"),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: HashMap<i64, User>,
}

impl MemoryUserStore {
    pub fn with(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_by_id(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&user_id).cloned())
    }
}

/// Tokens in insertion order; lookups return the first match.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Vec<AuthToken>,
}

impl MemoryTokenStore {
    pub fn with(tokens: impl IntoIterator<Item = (&'static str, User)>) -> Self {
        Self {
            tokens: tokens
                .into_iter()
                .map(|(token, user)| AuthToken {
                    token: token.to_string(),
                    user,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn find_by_token(&self, token: &str) -> Result<Option<AuthToken>, StoreError> {
        Ok(self.tokens.iter().find(|t| t.token == token).cloned())
    }
}

pub struct FailingStore;

#[async_trait]
impl UserStore for FailingStore {
    async fn get_by_id(&self, _user_id: i64) -> Result<Option<User>, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }
}

#[async_trait]
impl TokenStore for FailingStore {
    async fn find_by_token(&self, _token: &str) -> Result<Option<AuthToken>, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }
}

/// `abc123 -> user#7`, `remember-me -> user#9`; users 7 and 9 exist.
pub fn fixture_resolver(config: ResolverConfig) -> IdentityResolver {
    let users = MemoryUserStore::with([user(7), user(9)]);
    let tokens = MemoryTokenStore::with([("abc123", user(7)), ("remember-me", user(9))]);

    IdentityResolver::new(config, Arc::new(users), Arc::new(tokens))
}

/// In-memory session bag that counts writes.
#[derive(Default)]
pub struct RecordingBag {
    values: Mutex<HashMap<String, Value>>,
    writes: AtomicUsize,
}

impl RecordingBag {
    pub fn with(key: &str, value: Value) -> Self {
        let bag = Self::default();
        bag.values.lock().unwrap().insert(key.to_string(), value);
        bag
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        self.values.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.values.lock().unwrap().len()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionBag for RecordingBag {
    async fn get(&self, key: &str) -> Result<Option<Value>, SessionError> {
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), SessionError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.values.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}

/// Reads succeed empty; every write fails.
pub struct ReadOnlyBag;

#[async_trait]
impl SessionBag for ReadOnlyBag {
    async fn get(&self, _key: &str) -> Result<Option<Value>, SessionError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Value) -> Result<(), SessionError> {
        Err(SessionError::Backend("session store unavailable".into()))
    }
}

pub const TOKEN_SESSION_TTL_SECS: i64 = 60;
pub const SESSION_TTL_SECS: i64 = 60 * 60;

pub fn session_settings() -> SessionSettings {
    SessionSettings {
        cookie_name: SESSION_COOKIE.to_string(),
        ttl: Duration::seconds(SESSION_TTL_SECS),
        token_ttl: Duration::seconds(TOKEN_SESSION_TTL_SECS),
        secure: false,
    }
}

pub fn fixture_state(config: ResolverConfig) -> AppState {
    AppState::new(
        Arc::new(fixture_resolver(config)),
        REMEMBER_COOKIE,
        session_settings().token_ttl,
    )
}

/// Full router over an in-memory session store; the store is returned for inspection.
pub fn fixture_router(config: ResolverConfig) -> (Router, MemoryStore) {
    let store = MemoryStore::default();
    let router = build_router(
        fixture_state(config),
        session_layer(store.clone(), &session_settings()),
        &HttpSettings::default(),
    );

    (router, store)
}
