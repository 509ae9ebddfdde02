use crate::model::room::{RoomResponse, RoomsResponse};
use axum::{
    extract::{Path, State},
    Json,
};
use kernel::model::id::RoomId;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn show_room_list(
    State(registry): State<AppRegistry>,
) -> AppResult<Json<RoomsResponse>> {
    registry
        .room_repository()
        .find_all()
        .await
        .map(RoomsResponse::from)
        .map(Json)
}

pub async fn show_room(
    Path(room_id): Path<RoomId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<RoomResponse>> {
    registry
        .room_repository()
        .find_by_id(room_id)
        .await
        .and_then(|room| match room {
            Some(room) => Ok(Json(room.into())),
            None => Err(AppError::EntityNotFound(format!(
                "room ({room_id}) not found"
            ))),
        })
}
