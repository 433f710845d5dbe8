//! Per-client sessions on top of `tower-sessions`.
//!
//! Sessions live in Valkey when a cache is configured and in process memory
//! otherwise. Both expire on inactivity.
pub mod bag;
pub mod valkey;

use tower_sessions::{
    Expiry, SessionManagerLayer, SessionStore,
    cookie::{SameSite, time::Duration},
};

pub use bag::{SessionBag, SessionError};
pub use valkey::ValkeySessionStore;

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub cookie_name: String,
    /// Inactivity window of sessions that carry a login.
    pub ttl: Duration,
    /// Inactivity window of sessions created only to cache a request token.
    pub token_ttl: Duration,
    pub secure: bool,
}

impl SessionSettings {
    pub fn expiry(&self) -> Expiry {
        Expiry::OnInactivity(self.ttl)
    }

    pub fn token_expiry(&self) -> Expiry {
        Expiry::OnInactivity(self.token_ttl)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: "session_id".to_string(),
            ttl: Duration::days(1),
            token_ttl: Duration::minutes(5),
            secure: false,
        }
    }
}

/// Cookie-backed session layer: `HttpOnly`, `SameSite=Lax`, path `/`.
pub fn session_layer<S>(store: S, settings: &SessionSettings) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(settings.cookie_name.clone())
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(settings.secure)
        .with_path("/")
        .with_expiry(settings.expiry())
}
