mod announcements;
mod post_form;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use serde::Deserialize;
use crate::api::state::AppState;

/// Request body limit for the post form; three phone photos fit comfortably.
const MAX_POST_BODY: usize = 32 * 1024 * 1024;

/// `?notice=` code set by the redirect after a change
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}

pub fn create_portal_routes() -> Router<AppState> {
    Router::new()
        // Post form
        .route("/", get(post_form::post_page))
        .route(
            "/",
            post(post_form::submit_post).layer(DefaultBodyLimit::max(MAX_POST_BODY)),
        )

        // Browsing and moderation
        .route("/announcements", get(announcements::announcements_page))
        .route("/announcements/:id/resolve", post(announcements::resolve_announcement))
        .route("/announcements/:id/delete", post(announcements::delete_announcement))
}
