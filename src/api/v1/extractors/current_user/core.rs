use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Response;

use crate::services::auth::UnauthorizedResponder;
use crate::state::AppState;

use super::CurrentUser;

/// Handler で CurrentUser を受け取るための extractor
/// login middleware が CurrentUser を request.extensions() に insert 済みである前提
/// 見つからない場合は resolver の unauthorized レスポンス (401 JSON) を返す
pub struct CurrentUserExtractor(pub CurrentUser);

impl FromRequestParts<AppState> for CurrentUserExtractor {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(CurrentUserExtractor)
            .ok_or_else(|| state.resolver.unauthorized())
    }
}
