pub mod calls;
pub mod messages;
pub mod presence;
pub mod schedules;
pub mod users;

use crate::ws;
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Users
        .route("/users/me", get(users::get_me))
        // Presence
        .route("/presence/touch", post(presence::touch))
        // Messages
        .route("/messages/{peerId}", get(messages::list_conversation))
        // Calls
        .route("/calls", post(calls::initiate_call))
        .route("/calls/respond", post(calls::respond_call))
        // Schedules
        .route(
            "/schedules/{scheduleId}/reschedule",
            post(schedules::reschedule),
        );

    Router::new()
        .nest("/api", api_routes)
        .route("/gateway", get(ws::handler::ws_handler))
        .with_state(state)
}
