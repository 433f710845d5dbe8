/*
 * Responsibility
 * - middleware の公開インターフェース
 * - http: request id / trace / limit / timeout
 * - auth: login manager (current user の解決)
 * - session 自体は services::session の tower-sessions layer
 */
pub mod auth;
pub mod http;
