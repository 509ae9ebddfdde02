use crate::model::user::UserResponse;
use axum::{
    extract::{Path, State},
    Json,
};
use registry::AppRegistry;
use shared::error::AppResult;

// 予約フォームがメンバーコードを 1 件ずつ検証するためのエンドポイント
pub async fn check_member(
    Path(member_code): Path<String>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UserResponse>> {
    registry
        .reservation_service()
        .check_member(&member_code)
        .await
        .map(UserResponse::from)
        .map(Json)
}
