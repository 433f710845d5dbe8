use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::auth::User;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for MeResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name,
            created_at: user.created_at,
        }
    }
}
