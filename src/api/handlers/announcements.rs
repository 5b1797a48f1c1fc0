use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    api::state::AppState,
    domain::{Announcement, FilterQuery},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    #[serde(default)]
    pub password: String,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<Vec<Announcement>>> {
    let announcements = state.service_context.announcement_service
        .browse(&query.to_filter())
        .await?;

    Ok(Json(announcements))
}

pub async fn years(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let years = state.service_context.announcement_service.event_years().await?;
    Ok(Json(years))
}

pub async fn resolve(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PasswordRequest>,
) -> Result<Json<Announcement>> {
    let announcement = state.service_context.announcement_service
        .resolve(&id, &request.password)
        .await?;

    Ok(Json(announcement))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PasswordRequest>,
) -> Result<StatusCode> {
    state.service_context.announcement_service
        .delete(&id, &request.password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
