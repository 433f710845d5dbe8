//! Current-user lookup for protected routes.
//!
//! Order:
//! 1. `user_id` persisted in the session → `IdLoader`
//! 2. remember cookie → `TokenAuthenticator` (persists `user_id` on success)
//! 3. request token → `RequestAuthenticator` (writes its own session keys)
//!
//! A resolved user is stored as `CurrentUser` in request extensions. When none
//! resolves, the request still runs; `CurrentUserExtractor` rejects it with 401.
//!
//! Sessions that only cache a request token get the short token expiry, so
//! clients that never send the session cookie back do not pile up sessions.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::{self, Next},
    response::Response,
};
use serde_json::Value;
use tower_sessions::{Expiry, Session};

use crate::api::v1::extractors::CurrentUser;
use crate::error::AppError;
use crate::services::auth::{
    AuthError, IdLoader, RequestAuthenticator, TokenAuthenticator, User,
};
use crate::services::cookies;
use crate::services::session::SessionBag;
use crate::state::AppState;

pub const SESSION_USER_ID_KEY: &str = "user_id";

/// Which step of the lookup produced the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadedFrom {
    Session,
    RememberCookie,
    RequestToken,
}

/// Apply the login manager to `router` routes only (`route_layer`).
///
/// Requires the session layer to wrap the router.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state, login_middleware))
}

async fn login_middleware(
    State(state): State<AppState>,
    session: Session,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let loaded = load_current_user(
        state.resolver.as_ref(),
        &state.remember_cookie,
        req.headers(),
        &session,
    )
    .await?;

    if let Some((user, from)) = loaded {
        if from == LoadedFrom::RequestToken {
            session.set_expiry(Some(Expiry::OnInactivity(state.token_session_ttl)));
        }
        req.extensions_mut().insert(CurrentUser::new(user));
    }

    Ok(next.run(req).await)
}

pub async fn load_current_user<R>(
    resolver: &R,
    remember_cookie: &str,
    headers: &HeaderMap,
    session: &dyn SessionBag,
) -> Result<Option<(User, LoadedFrom)>, AuthError>
where
    R: RequestAuthenticator + IdLoader + TokenAuthenticator + ?Sized,
{
    let session_user_id = session
        .get(SESSION_USER_ID_KEY)
        .await?
        .and_then(|v| v.as_i64());

    if let Some(user_id) = session_user_id {
        if let Some(user) = resolver.resolve_user_from_id(user_id).await? {
            return Ok(Some((user, LoadedFrom::Session)));
        }
        tracing::debug!(user_id, "session user no longer exists");
    }

    if let Some(token) = cookies::get_cookie(headers, remember_cookie) {
        if let Some(user) = resolver.resolve_user_from_token(&token).await? {
            session.set(SESSION_USER_ID_KEY, Value::from(user.id)).await?;
            tracing::debug!(user_id = user.id, "user restored from remember cookie");
            return Ok(Some((user, LoadedFrom::RememberCookie)));
        }
    }

    Ok(resolver
        .resolve_user_from_request(headers, session)
        .await?
        .map(|user| (user, LoadedFrom::RequestToken)))
}
