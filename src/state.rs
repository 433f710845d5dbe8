/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - resolver: IdentityResolver, remember cookie 名, token 専用 session の寿命
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - session 本体は tower-sessions の layer が持つ
 */
use std::sync::Arc;

use tower_sessions::cookie::time::Duration;

use crate::services::auth::IdentityResolver;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<IdentityResolver>,
    pub remember_cookie: Arc<str>,
    pub token_session_ttl: Duration,
}

impl AppState {
    pub fn new(
        resolver: Arc<IdentityResolver>,
        remember_cookie: impl Into<Arc<str>>,
        token_session_ttl: Duration,
    ) -> Self {
        Self {
            resolver,
            remember_cookie: remember_cookie.into(),
            token_session_ttl,
        }
    }
}
