pub mod handlers;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    services::ServeDir,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
    web::{self, uploads::IMAGES_ROUTE},
};
use state::AppState;

/// Full application: HTML pages, JSON API and the uploaded images.
pub fn create_app(
    service_context: Arc<ServiceContext>,
    settings: Arc<Settings>,
) -> Router {
    let images = ServeDir::new(&settings.storage.images_dir);
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Health and API info
        .route("/health", get(handlers::root::health_check))
        .route("/api", get(handlers::root::api_info))

        // API routes
        .nest("/api", api_routes())

        // Add state to the router
        .with_state(app_state.clone())

        // Web pages and uploaded images
        .merge(web::create_web_routes(app_state))
        .nest_service(IMAGES_ROUTE, images)

        // Middleware
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/announcements", announcement_routes())
}

fn announcement_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::announcements::list))
        .route("/years", get(handlers::announcements::years))
        .route("/:id/resolve", post(handlers::announcements::resolve))
        .route("/:id/delete", post(handlers::announcements::delete))
}
