mod common;

use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode, header};
use axum::response::Response;
use serde_json::{Value, json};
use token_auth::middleware::auth::login::{LoadedFrom, SESSION_USER_ID_KEY, load_current_user};
use token_auth::services::auth::{ResolverConfig, TokenSource};
use tower::ServiceExt;
use tower_sessions::cookie::time::{Duration, OffsetDateTime};
use tower_sessions::session::{Id, Record};
use tower_sessions::{MemoryStore, SessionStore};

use common::{
    REMEMBER_COOKIE, RecordingBag, SESSION_COOKIE, SESSION_TTL_SECS, TOKEN_SESSION_TTL_SECS,
    fixture_resolver, fixture_router,
};

async fn get(app: axum::Router, uri: &str, headers: &[(&str, &str)]) -> Response {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn session_id_from(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.strip_prefix(&format!("{SESSION_COOKIE}=")))
        .and_then(|v| v.split(';').next())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

async fn stored_record(store: &MemoryStore, session_id: &str) -> Record {
    let id: Id = session_id.parse().expect("session id");
    store.load(&id).await.unwrap().expect("saved")
}

fn expires_within(record: &Record, seconds: i64) -> bool {
    record.expiry_date <= OffsetDateTime::now_utc() + Duration::seconds(seconds + 1)
}

#[tokio::test]
async fn health_is_public() {
    let (app, _) = fixture_router(ResolverConfig::default());

    let response = get(app, "/api/v1/health", &[]).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn me_without_token_is_unauthorized_json() {
    let (app, _) = fixture_router(ResolverConfig::default());

    let response = get(app, "/api/v1/me", &[]).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert!(session_id_from(&response).is_none());

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(
        &bytes[..],
        br#"{"msg":"Not authorized","code":"not_authorized"}"#
    );
}

#[tokio::test]
async fn me_with_unknown_token_is_unauthorized() {
    let (app, _) = fixture_router(ResolverConfig::default());

    let response = get(app, "/api/v1/me", &[("X-Auth-Token", "nope")]).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_id_from(&response).is_none());
    assert_eq!(
        json_body(response).await,
        json!({"msg": "Not authorized", "code": "not_authorized"})
    );
}

#[tokio::test]
async fn me_with_header_token_returns_user_and_starts_session() {
    let (app, store) = fixture_router(ResolverConfig::default());

    let response = get(app, "/api/v1/me", &[("X-Auth-Token", "abc123")]).await;

    assert_eq!(response.status(), StatusCode::OK);
    let session_id = session_id_from(&response).expect("session cookie");
    let body = json_body(response).await;
    assert_eq!(body["id"], 7);
    assert_eq!(body["user_name"], "user7");

    let stored = stored_record(&store, &session_id).await;
    assert_eq!(stored.data.get("is_authenticated"), Some(&json!(true)));
    assert_eq!(stored.data.get("auth_token"), Some(&json!("abc123")));
}

#[tokio::test]
async fn header_token_sessions_expire_quickly() {
    let (app, store) = fixture_router(ResolverConfig::default());

    // a client that never sends the session cookie back
    for _ in 0..3 {
        let response = get(app.clone(), "/api/v1/me", &[("X-Auth-Token", "abc123")]).await;
        assert_eq!(response.status(), StatusCode::OK);

        let session_id = session_id_from(&response).expect("session cookie");
        let stored = stored_record(&store, &session_id).await;
        assert!(
            expires_within(&stored, TOKEN_SESSION_TTL_SECS),
            "token-only session outlives the token ttl: {}",
            stored.expiry_date
        );
    }
}

#[tokio::test]
async fn remember_cookie_sessions_keep_the_long_expiry() {
    let (app, store) = fixture_router(ResolverConfig::default());

    let cookie = format!("{REMEMBER_COOKIE}=remember-me");
    let response = get(app, "/api/v1/me", &[("Cookie", cookie.as_str())]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let session_id = session_id_from(&response).expect("session cookie");
    let stored = stored_record(&store, &session_id).await;
    assert!(!expires_within(&stored, TOKEN_SESSION_TTL_SECS));
    assert!(expires_within(&stored, SESSION_TTL_SECS));
}

#[tokio::test]
async fn me_with_cookie_token_in_cookie_mode() {
    let (app, _) = fixture_router(ResolverConfig::new(TokenSource::Cookie));

    let response = get(app.clone(), "/api/v1/me", &[("Cookie", "auth_token=abc123")]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["id"], 7);

    let response = get(app, "/api/v1/me", &[("X-Auth-Token", "abc123")]).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn remember_cookie_persists_user_id_for_later_requests() {
    let (app, store) = fixture_router(ResolverConfig::default());

    let cookie = format!("{REMEMBER_COOKIE}=remember-me");
    let response = get(app.clone(), "/api/v1/me", &[("Cookie", cookie.as_str())]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let session_id = session_id_from(&response).expect("session cookie");
    assert_eq!(json_body(response).await["id"], 9);

    let stored = stored_record(&store, &session_id).await;
    assert_eq!(stored.data.get(SESSION_USER_ID_KEY), Some(&json!(9)));

    // only the session cookie this time
    let cookie = format!("{SESSION_COOKIE}={session_id}");
    let response = get(app, "/api/v1/me", &[("Cookie", cookie.as_str())]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["id"], 9);
}

#[tokio::test]
async fn unknown_session_id_starts_fresh() {
    let (app, _) = fixture_router(ResolverConfig::default());

    let cookie = format!("{SESSION_COOKIE}={}", Id::default());
    let response = get(app, "/api/v1/me", &[("Cookie", cookie.as_str())]).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_user_id_takes_precedence_over_request_token() {
    let resolver = fixture_resolver(ResolverConfig::default());
    let session = RecordingBag::with(SESSION_USER_ID_KEY, json!(9));

    let mut headers = HeaderMap::new();
    headers.insert("x-auth-token", HeaderValue::from_static("abc123"));

    let loaded = load_current_user(&resolver, REMEMBER_COOKIE, &headers, &session)
        .await
        .unwrap();

    assert_eq!(loaded.map(|(u, from)| (u.id, from)), Some((9, LoadedFrom::Session)));
    assert_eq!(session.writes(), 0);
}

#[tokio::test]
async fn stale_session_user_id_falls_back_to_request_token() {
    let resolver = fixture_resolver(ResolverConfig::default());
    let session = RecordingBag::with(SESSION_USER_ID_KEY, json!(404));

    let mut headers = HeaderMap::new();
    headers.insert("x-auth-token", HeaderValue::from_static("abc123"));

    let loaded = load_current_user(&resolver, REMEMBER_COOKIE, &headers, &session)
        .await
        .unwrap();

    assert_eq!(
        loaded.map(|(u, from)| (u.id, from)),
        Some((7, LoadedFrom::RequestToken))
    );
    assert_eq!(session.value("auth_token"), Some(json!("abc123")));
}

#[tokio::test]
async fn remember_cookie_does_not_write_request_token_keys() {
    let resolver = fixture_resolver(ResolverConfig::default());
    let session = RecordingBag::default();

    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        HeaderValue::from_static("remember_token=remember-me"),
    );

    let loaded = load_current_user(&resolver, REMEMBER_COOKIE, &headers, &session)
        .await
        .unwrap();

    assert_eq!(
        loaded.map(|(u, from)| (u.id, from)),
        Some((9, LoadedFrom::RememberCookie))
    );
    assert_eq!(session.value(SESSION_USER_ID_KEY), Some(json!(9)));
    assert_eq!(session.value("is_authenticated"), None);
    assert_eq!(session.value("auth_token"), None);
}

#[tokio::test]
async fn nothing_to_go_on_loads_nobody() {
    let resolver = fixture_resolver(ResolverConfig::default());
    let session = RecordingBag::default();

    let loaded = load_current_user(&resolver, REMEMBER_COOKIE, &HeaderMap::new(), &session)
        .await
        .unwrap();

    assert!(loaded.is_none());
    assert_eq!(session.writes(), 0);
}
