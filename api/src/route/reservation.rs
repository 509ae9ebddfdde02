use axum::{
    routing::{delete, get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::reservation::{cancel_reservation, reserve_room, show_my_reservations};

pub fn build_reservation_routers() -> Router<AppRegistry> {
    let reservation_routers = Router::new()
        .route("/", post(reserve_room))
        .route("/:reservation_id", delete(cancel_reservation))
        .route("/my/:member_code", get(show_my_reservations));

    Router::new().nest("/reservations", reservation_routers)
}
