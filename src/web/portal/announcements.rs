use askama::Template;
use chrono::Local;
use axum::{
    extract::{Form, Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    api::state::AppState,
    domain::{available_years, Announcement, Category, City, FilterQuery, PostType},
    error::AppError,
    service::BoardView,
    web::templates::{redirect_after_change, HtmlTemplate, Notice, SelectOption},
    web::uploads::{image_exists, public_url},
};
use super::NoticeQuery;

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

#[derive(Template)]
#[template(path = "portal/announcements.html")]
pub struct AnnouncementsTemplate {
    pub notice: Option<Notice>,
    pub type_options: Vec<SelectOption>,
    pub city_options: Vec<SelectOption>,
    pub category_options: Vec<SelectOption>,
    pub include_resolved: bool,
    pub date_mode: String,
    pub date: String,
    pub month_options: Vec<SelectOption>,
    pub year_options: Vec<SelectOption>,
    pub cards: Vec<AnnouncementCard>,
    /// Current filters, echoed into the moderation forms
    pub filters: String,
}

pub struct AnnouncementCard {
    pub id: String,
    pub is_lost: bool,
    pub type_label: String,
    pub type_word: String,
    pub category: String,
    pub city: String,
    pub description: String,
    pub image_urls: Vec<String>,
    pub event_date: String,
    pub date: String,
    pub phone: String,
    pub resolved: bool,
}

impl AnnouncementCard {
    async fn from_announcement(a: Announcement) -> Self {
        let mut image_urls = Vec::new();
        for path in a.image_paths() {
            if image_exists(path).await {
                if let Some(url) = public_url(path) {
                    image_urls.push(url);
                }
            }
        }

        Self {
            id: a.id,
            is_lost: a.post_type == PostType::Lost,
            type_label: a.post_type.label().to_string(),
            type_word: a.post_type.as_str().to_string(),
            category: a.category.as_str().to_string(),
            city: a.city.as_str().to_string(),
            description: a.description,
            image_urls,
            event_date: a.event_date,
            date: a.date,
            phone: a.phone,
            resolved: a.resolved,
        }
    }
}

/// Select options with a leading "All" entry.
fn with_all<'a>(
    values: impl Iterator<Item = (&'a str, &'a str)>,
    current: Option<&str>,
) -> Vec<SelectOption> {
    let current = current.map(str::trim).filter(|c| !c.is_empty()).unwrap_or("All");
    std::iter::once(SelectOption::new("All", "All", current))
        .chain(values.map(|(value, label)| SelectOption::new(value, label, current)))
        .collect()
}

/// Browse URL for the given filters, with an optional notice code.
pub fn board_url(filters: &FilterQuery, notice: Option<&str>) -> String {
    let mut query = serde_urlencoded::to_string(filters).unwrap_or_default();
    if let Some(code) = notice {
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str("notice=");
        query.push_str(code);
    }

    if query.is_empty() {
        "/announcements".to_string()
    } else {
        format!("/announcements?{}", query)
    }
}

// GET /announcements
pub async fn announcements_page(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
    Query(notice_query): Query<NoticeQuery>,
) -> impl IntoResponse {
    let service = &state.service_context.announcement_service;
    let mut notice = notice_query.notice.as_deref().and_then(Notice::from_code);

    let board = match service.board(&query.to_filter()).await {
        Ok(board) => board,
        Err(e) => {
            tracing::error!("Failed to load announcements: {}", e);
            notice = Some(Notice::error("Could not load announcements."));
            BoardView {
                announcements: Vec::new(),
                years: available_years(&[], Local::now().date_naive()),
            }
        }
    };

    if board.announcements.is_empty() && notice.is_none() {
        notice = Some(Notice::info("No announcements match the selected criteria."));
    }

    let mut cards = Vec::with_capacity(board.announcements.len());
    for announcement in board.announcements {
        cards.push(AnnouncementCard::from_announcement(announcement).await);
    }

    let month = query.month.clone().unwrap_or_else(|| "1".to_string());
    let year = query.year.clone().unwrap_or_default();

    let template = AnnouncementsTemplate {
        notice,
        type_options: with_all(
            PostType::ALL.iter().map(|t| (t.label(), t.label())),
            query.post_type.as_deref(),
        ),
        city_options: with_all(
            City::ALL.iter().map(|c| (c.as_str(), c.as_str())),
            query.city.as_deref(),
        ),
        category_options: with_all(
            Category::ALL.iter().map(|c| (c.as_str(), c.as_str())),
            query.category.as_deref(),
        ),
        include_resolved: query.to_filter().include_resolved,
        date_mode: query.date_mode().to_string(),
        date: query.date.clone().unwrap_or_default(),
        month_options: MONTHS
            .iter()
            .enumerate()
            .map(|(i, name)| SelectOption::new((i + 1).to_string(), *name, month.trim()))
            .collect(),
        year_options: board
            .years
            .iter()
            .map(|y| SelectOption::new(y.as_str(), y.as_str(), year.trim()))
            .collect(),
        cards,
        filters: serde_urlencoded::to_string(&query).unwrap_or_default(),
    };

    HtmlTemplate(template)
}

#[derive(Debug, Deserialize)]
pub struct ModerationForm {
    #[serde(default)]
    pub password: String,
    /// Filters of the page the form was submitted from
    #[serde(default)]
    pub filters: String,
}

impl ModerationForm {
    fn return_filters(&self) -> FilterQuery {
        serde_urlencoded::from_str(&self.filters).unwrap_or_default()
    }
}

fn moderation_redirect(form: &ModerationForm, outcome: Result<&'static str, AppError>) -> Response {
    let code = match outcome {
        Ok(code) => code,
        Err(AppError::AuthFailure) => "bad_password",
        Err(AppError::NotFound(_)) => "not_found",
        Err(e) => return e.into_response(),
    };
    redirect_after_change(&board_url(&form.return_filters(), Some(code)))
}

// POST /announcements/:id/resolve
pub async fn resolve_announcement(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ModerationForm>,
) -> Response {
    let outcome = state.service_context.announcement_service
        .resolve(&id, &form.password)
        .await
        .map(|_| "resolved");

    moderation_redirect(&form, outcome)
}

// POST /announcements/:id/delete
pub async fn delete_announcement(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ModerationForm>,
) -> Response {
    let outcome = state.service_context.announcement_service
        .delete(&id, &form.password)
        .await
        .map(|_| "deleted");

    moderation_redirect(&form, outcome)
}
