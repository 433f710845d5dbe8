/*
 * Responsibility
 * - Identity types shared between the resolver, stores and handlers
 * - The resolver only reads these; stores construct them
 */
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A user record as returned by a `UserStore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

/// An opaque token string paired with the user that owns it.
///
/// A token string maps to at most one `AuthToken`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub token: String,
    pub user: User,
}
