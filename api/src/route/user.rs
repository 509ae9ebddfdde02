use axum::{routing::get, Router};
use registry::AppRegistry;

use crate::handler::user::check_member;

pub fn build_member_routers() -> Router<AppRegistry> {
    let member_routers = Router::new().route("/:member_code", get(check_member));

    Router::new().nest("/members", member_routers)
}
