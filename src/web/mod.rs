pub mod templates;
pub mod portal;
pub mod uploads;

use axum::Router;
use crate::api::state::AppState;

pub fn create_web_routes(state: AppState) -> Router {
    Router::new()
        .merge(portal::create_portal_routes())
        .with_state(state)
}
