/*
 * Responsibility
 * - auth_tokens テーブル向け SQLx 操作
 * - token 文字列の完全一致で (token, owning user) を引く
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

/// A token row joined with its owning user.
///
/// Schema (see `migrations/`):
/// - auth_tokens.id (bigserial)
/// - auth_tokens.token (text, unique)
/// - auth_tokens.user_id (bigint, references users.id)
#[derive(Debug, FromRow)]
pub struct TokenRow {
    pub token: String,
    pub user_id: i64,
    pub user_name: String,
    pub user_created_at: DateTime<Utc>,
}

pub async fn find_by_token(db: &PgPool, token: &str) -> Result<Option<TokenRow>, RepoError> {
    // The unique index makes ORDER BY a no-op in a healthy schema; it keeps
    // the pick deterministic if the constraint is ever dropped.
    let row = sqlx::query_as::<_, TokenRow>(
        r#"
        SELECT
            t.token,
            u.id AS user_id,
            u.user_name,
            u.created_at AS user_created_at
        FROM auth_tokens t
        JOIN users u ON u.id = t.user_id
        WHERE t.token = $1
        ORDER BY t.id
        LIMIT 1
        "#,
    )
    .bind(token)
    .fetch_optional(db)
    .await?;

    Ok(row)
}
