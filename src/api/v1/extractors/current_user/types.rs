/*
 * Responsibility
 * - Handler から見える「解決済みユーザー」の型
 * - login middleware が解決して request extensions に格納し、handler はこの型だけを受け取る
 */
use crate::services::auth::User;

/// The user resolved for the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
}

impl CurrentUser {
    pub fn new(user: User) -> Self {
        Self { user }
    }
}
