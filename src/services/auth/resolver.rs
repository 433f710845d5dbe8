//! Identity resolver: request / user id / bare token → `User`.
//!
//! - Token source is either a request header or a cookie, fixed at construction.
//! - A token is valid iff the token store knows it. No expiry, no rate limiting.
//! - On request-token success the session gets `is_authenticated = true` and
//!   `auth_token = <token>`. Nothing is written on any other path.
//! - Store and session failures are returned as-is; absence is `Ok(None)`.
use std::{fmt, str::FromStr, sync::Arc};

use async_trait::async_trait;
use axum::{
    Json,
    http::{HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::services::auth::store::{StoreError, TokenStore, UserStore};
use crate::services::auth::types::{AuthToken, User};
use crate::services::cookies;
use crate::services::session::{SessionBag, SessionError};

pub const DEFAULT_TOKEN_HEADER: &str = "x-auth-token";
pub const DEFAULT_TOKEN_COOKIE: &str = "auth_token";

pub const SESSION_AUTHENTICATED_KEY: &str = "is_authenticated";
pub const SESSION_TOKEN_KEY: &str = "auth_token";

pub const UNAUTHORIZED_MESSAGE: &str = "Not authorized";
pub const UNAUTHORIZED_CODE: &str = "not_authorized";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Where the request token is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenSource {
    #[default]
    Header,
    Cookie,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid token source: {0:?} (expected \"header\" or \"cookie\")")]
pub struct InvalidTokenSource(pub String);

impl FromStr for TokenSource {
    type Err = InvalidTokenSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "header" => Ok(Self::Header),
            "cookie" => Ok(Self::Cookie),
            other => Err(InvalidTokenSource(other.to_string())),
        }
    }
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Header => f.write_str("header"),
            TokenSource::Cookie => f.write_str("cookie"),
        }
    }
}

/// Immutable resolver configuration.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    source: TokenSource,
    header_name: HeaderName,
    cookie_name: String,
}

impl ResolverConfig {
    pub fn new(source: TokenSource) -> Self {
        Self {
            source,
            header_name: HeaderName::from_static(DEFAULT_TOKEN_HEADER),
            cookie_name: DEFAULT_TOKEN_COOKIE.to_string(),
        }
    }

    pub fn with_header_name(mut self, header_name: HeaderName) -> Self {
        self.header_name = header_name;
        self
    }

    pub fn with_cookie_name(mut self, cookie_name: impl Into<String>) -> Self {
        self.cookie_name = cookie_name.into();
        self
    }

    pub fn source(&self) -> TokenSource {
        self.source
    }

    pub fn header_name(&self) -> &HeaderName {
        &self.header_name
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new(TokenSource::default())
    }
}

/// Loads the user carried by an incoming request, caching the token into the session.
#[async_trait]
pub trait RequestAuthenticator: Send + Sync {
    async fn resolve_user_from_request(
        &self,
        headers: &HeaderMap,
        session: &dyn SessionBag,
    ) -> Result<Option<User>, AuthError>;
}

/// Loads a user by the id a previous request persisted in the session.
#[async_trait]
pub trait IdLoader: Send + Sync {
    async fn resolve_user_from_id(&self, user_id: i64) -> Result<Option<User>, StoreError>;
}

/// Loads a user from a bare token, without touching any session.
#[async_trait]
pub trait TokenAuthenticator: Send + Sync {
    async fn resolve_user_from_token(&self, token: &str) -> Result<Option<User>, StoreError>;
}

/// Produces the response for protected routes when no user resolved.
pub trait UnauthorizedResponder: Send + Sync {
    fn unauthorized(&self) -> Response;
}

#[derive(Serialize)]
struct UnauthorizedBody {
    msg: &'static str,
    code: &'static str,
}

/// `401` with `content-type: application/json` and
/// `{"msg":"Not authorized","code":"not_authorized"}`.
pub fn unauthorized_response() -> Response {
    let body = UnauthorizedBody {
        msg: UNAUTHORIZED_MESSAGE,
        code: UNAUTHORIZED_CODE,
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

pub struct IdentityResolver {
    config: ResolverConfig,
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
}

impl IdentityResolver {
    pub fn new(
        config: ResolverConfig,
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            config,
            users,
            tokens,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Reads the token from the configured source only.
    ///
    /// `None` means no token was supplied; non UTF-8 header values count as absent.
    pub fn extract_request_token(&self, headers: &HeaderMap) -> Option<String> {
        match self.config.source {
            TokenSource::Header => headers
                .get(&self.config.header_name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            TokenSource::Cookie => cookies::get_cookie(headers, &self.config.cookie_name),
        }
    }

    async fn find_token(&self, token: &str) -> Result<Option<AuthToken>, StoreError> {
        self.tokens.find_by_token(token).await
    }
}

impl fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RequestAuthenticator for IdentityResolver {
    async fn resolve_user_from_request(
        &self,
        headers: &HeaderMap,
        session: &dyn SessionBag,
    ) -> Result<Option<User>, AuthError> {
        let Some(token) = self.extract_request_token(headers) else {
            tracing::debug!(source = %self.config.source, "no request token");
            return Ok(None);
        };

        let Some(auth_token) = self.find_token(&token).await? else {
            tracing::debug!(source = %self.config.source, "unknown request token");
            return Ok(None);
        };

        session
            .set(SESSION_AUTHENTICATED_KEY, Value::Bool(true))
            .await?;
        session
            .set(SESSION_TOKEN_KEY, Value::String(auth_token.token))
            .await?;

        tracing::debug!(user_id = auth_token.user.id, "user resolved from request token");
        Ok(Some(auth_token.user))
    }
}

#[async_trait]
impl IdLoader for IdentityResolver {
    async fn resolve_user_from_id(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        self.users.get_by_id(user_id).await
    }
}

#[async_trait]
impl TokenAuthenticator for IdentityResolver {
    async fn resolve_user_from_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        Ok(self.find_token(token).await?.map(|t| t.user))
    }
}

impl UnauthorizedResponder for IdentityResolver {
    fn unauthorized(&self) -> Response {
        unauthorized_response()
    }
}
