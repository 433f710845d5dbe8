/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, REDIS_URL, token source, cookie 名など)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 *   - 数値は parse できなければ Invalid(key)。未設定/空なら default
 *   - TTL / timeout は 0 を拒否
 *   - cookie 名の重複を拒否
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderName;
use tower_sessions::cookie::time::Duration as TimeDuration;

use crate::services::auth::TokenSource;
use crate::middleware::http::HttpSettings;
use crate::services::auth::resolver::{DEFAULT_TOKEN_COOKIE, DEFAULT_TOKEN_HEADER};
use crate::services::session::SessionSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    pub database_max_connections: u32,

    // None => sessions live in process memory
    pub redis_url: Option<String>,

    pub auth_token_source: TokenSource,
    pub auth_token_header: HeaderName,
    pub auth_token_cookie: String,
    pub auth_remember_cookie: String,

    pub session_cookie: String,
    pub session_cookie_secure: bool,
    pub session_ttl_seconds: u32,
    pub session_token_ttl_seconds: u32,

    pub http_body_limit_bytes: usize,
    pub http_request_timeout_seconds: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parse_var("PORT", env("PORT"), 3000)?;

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let database_max_connections: u32 = parse_var(
            "DATABASE_MAX_CONNECTIONS",
            env("DATABASE_MAX_CONNECTIONS"),
            5,
        )?;

        let redis_url = env("REDIS_URL").filter(|s| !s.trim().is_empty());

        // Unknown modes fail startup instead of failing on the first request.
        let auth_token_source = match std::env::var("AUTH_TOKEN_SOURCE") {
            Ok(v) => v
                .trim()
                .parse::<TokenSource>()
                .map_err(|_| ConfigError::Invalid("AUTH_TOKEN_SOURCE"))?,
            Err(_) => TokenSource::default(),
        };

        let auth_token_header = std::env::var("AUTH_TOKEN_HEADER")
            .unwrap_or_else(|_| DEFAULT_TOKEN_HEADER.to_string());
        let auth_token_header = HeaderName::from_bytes(auth_token_header.trim().as_bytes())
            .map_err(|_| ConfigError::Invalid("AUTH_TOKEN_HEADER"))?;

        let auth_token_cookie = cookie_name("AUTH_TOKEN_COOKIE", DEFAULT_TOKEN_COOKIE)?;
        let auth_remember_cookie = cookie_name("AUTH_REMEMBER_COOKIE", "remember_token")?;
        let session_cookie = cookie_name("SESSION_COOKIE", "session_id")?;
        check_distinct_cookies(&[
            ("AUTH_TOKEN_COOKIE", &auth_token_cookie),
            ("AUTH_REMEMBER_COOKIE", &auth_remember_cookie),
            ("SESSION_COOKIE", &session_cookie),
        ])?;

        let session_cookie_secure = parse_var(
            "SESSION_COOKIE_SECURE",
            env("SESSION_COOKIE_SECURE"),
            app_env.is_production(),
        )?;
        let session_ttl_seconds =
            positive_seconds("SESSION_TTL_SECONDS", env("SESSION_TTL_SECONDS"), 60 * 60 * 24)?;
        let session_token_ttl_seconds = positive_seconds(
            "SESSION_TOKEN_TTL_SECONDS",
            env("SESSION_TOKEN_TTL_SECONDS"),
            60 * 5,
        )?;

        let http_body_limit_bytes: usize = parse_var(
            "HTTP_BODY_LIMIT_BYTES",
            env("HTTP_BODY_LIMIT_BYTES"),
            1024 * 1024,
        )?;
        let http_request_timeout_seconds = positive_seconds(
            "HTTP_REQUEST_TIMEOUT_SECONDS",
            env("HTTP_REQUEST_TIMEOUT_SECONDS"),
            30,
        )?;

        Ok(Self {
            addr,
            app_env,
            database_url,
            database_max_connections,
            redis_url,
            auth_token_source,
            auth_token_header,
            auth_token_cookie,
            auth_remember_cookie,
            session_cookie,
            session_cookie_secure,
            session_ttl_seconds,
            session_token_ttl_seconds,
            http_body_limit_bytes,
            http_request_timeout_seconds,
        })
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            cookie_name: self.session_cookie.clone(),
            ttl: TimeDuration::seconds(i64::from(self.session_ttl_seconds)),
            token_ttl: TimeDuration::seconds(i64::from(self.session_token_ttl_seconds)),
            secure: self.session_cookie_secure,
        }
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            body_limit_bytes: self.http_body_limit_bytes,
            request_timeout: Duration::from_secs(u64::from(self.http_request_timeout_seconds)),
        }
    }
}

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

// Unset or blank => default; anything else must parse.
fn parse_var<T: FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid(key)),
    }
}

fn positive_seconds(
    key: &'static str,
    raw: Option<String>,
    default: u32,
) -> Result<u32, ConfigError> {
    match parse_var(key, raw, default)? {
        0 => Err(ConfigError::Invalid(key)),
        seconds => Ok(seconds),
    }
}

// The three cookies share one request header; equal names would shadow each other.
fn check_distinct_cookies(cookies: &[(&'static str, &str)]) -> Result<(), ConfigError> {
    for (i, (_, name)) in cookies.iter().enumerate() {
        if let Some((key, _)) = cookies[i + 1..].iter().find(|(_, other)| other == name) {
            return Err(ConfigError::Invalid(*key));
        }
    }
    Ok(())
}

fn cookie_name(key: &'static str, default: &str) -> Result<String, ConfigError> {
    let name = std::env::var(key).unwrap_or_else(|_| default.to_string());
    let name = name.trim();

    if is_valid_cookie_name(name) {
        Ok(name.to_string())
    } else {
        Err(ConfigError::Invalid(key))
    }
}

// RFC 6265 cookie-name: a token, i.e. visible ASCII without separators.
fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b)
        })
}
