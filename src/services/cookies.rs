//! Request `Cookie` header lookup.
use axum::http::{HeaderMap, header};

/// Returns the value of cookie `name` from the request `Cookie` header(s).
///
/// The first occurrence wins. Surrounding double quotes are stripped.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}
