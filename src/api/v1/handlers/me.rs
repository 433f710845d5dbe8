/*
 * Responsibility
 * - GET /me: 解決済みユーザーを返す
 * - 未解決なら CurrentUserExtractor が 401 を返すので handler には来ない
 */
use axum::Json;

use crate::api::v1::{dto::me::MeResponse, extractors::CurrentUserExtractor};

pub async fn me(CurrentUserExtractor(current): CurrentUserExtractor) -> Json<MeResponse> {
    Json(MeResponse::from(current.user))
}
