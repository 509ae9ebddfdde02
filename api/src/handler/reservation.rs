use crate::model::reservation::{
    CreateReservationRequest, ReservationListingsResponse, ReservationResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::id::ReservationId;
use registry::AppRegistry;
use shared::error::AppResult;

pub async fn reserve_room(
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<ReservationResponse>)> {
    req.validate(&())?;

    registry
        .reservation_service()
        .book(req.into())
        .await
        .map(|reservation| (StatusCode::CREATED, Json(reservation.into())))
}

pub async fn cancel_reservation(
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .reservation_service()
        .cancel(reservation_id)
        .await
        .map(|_| StatusCode::OK)
}

pub async fn show_my_reservations(
    Path(member_code): Path<String>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationListingsResponse>> {
    registry
        .reservation_service()
        .list_for_user(&member_code)
        .await
        .map(ReservationListingsResponse::from)
        .map(Json)
}
