/*
 * Responsibility
 * - tracing / panic hook 初期化
 * - Config読み込み → 依存生成 (PgPool, stores, resolver) → Router 組み立て
 * - session store の選択 (REDIS_URL あり: Valkey, なし: MemoryStore)
 * - Middleware の適用 (http / tower-sessions / login manager)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_sessions::{MemoryStore, SessionManagerLayer, SessionStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::middleware::http::HttpSettings;
use crate::services::auth::{
    build_identity_resolver,
    pg_store::{PgTokenStore, PgUserStore},
};
use crate::services::cache::{CacheClient, ValkeyClient};
use crate::services::session::{ValkeySessionStore, session_layer};
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,token_auth=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let sessions = config.session_settings();
    let http = config.http_settings();

    let app = match &config.redis_url {
        Some(url) => {
            let cache = ValkeyClient::new(url).await?;
            tracing::info!(backend = cache.backend_name(), "session store ready");
            build_router(state, session_layer(ValkeySessionStore::new(cache), &sessions), &http)
        }
        None => {
            tracing::warn!("REDIS_URL is not set; sessions are kept in process memory");
            build_router(state, session_layer(MemoryStore::default(), &sessions), &http)
        }
    };

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    let resolver = build_identity_resolver(
        config,
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgTokenStore::new(pool)),
    );

    Ok(AppState::new(
        resolver,
        config.auth_remember_cookie.as_str(),
        config.session_settings().token_ttl,
    ))
}

/// Session layer wraps the API; HTTP middleware wraps everything.
pub fn build_router<S>(
    state: AppState,
    sessions: SessionManagerLayer<S>,
    http: &HttpSettings,
) -> Router
where
    S: SessionStore + Clone,
{
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state)
        .layer(sessions);

    middleware::http::apply(router, http)
}
