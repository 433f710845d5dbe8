/*
 * Responsibility
 * - users テーブル向け SQLx 操作 (id による参照のみ)
 * - DB エラーは RepoError として返す
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

pub async fn get(db: &PgPool, user_id: i64) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, user_name, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}
