use askama::Template;
use axum::{
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{Local, NaiveDate};

use crate::{
    api::state::AppState,
    domain::{validate_fields, Category, City, NewAnnouncement, PostType},
    error::{AppError, Result},
    web::templates::{redirect_after_change, HtmlTemplate, Notice, SelectOption},
    web::uploads::{UploadedImage, ALLOWED_EXTENSIONS},
};
use super::NoticeQuery;

#[derive(Template)]
#[template(path = "portal/post.html")]
pub struct PostTemplate {
    pub notice: Option<Notice>,
    pub type_options: Vec<SelectOption>,
    pub category_options: Vec<SelectOption>,
    pub city_options: Vec<SelectOption>,
    pub description: String,
    pub event_date: String,
    pub phone: String,
    pub accept: String,
}

/// Raw values of the post form, kept so a rejected form can be shown again.
#[derive(Debug, Default, Clone)]
pub struct PostForm {
    pub post_type: String,
    pub category: String,
    pub city: String,
    pub description: String,
    pub event_date: String,
    pub phone: String,
    pub delete_password: String,
}

impl PostForm {
    /// Free-text checks run before the choice and date fields are parsed,
    /// so their errors are the ones reported first.
    pub fn to_submission(&self, today: NaiveDate) -> Result<NewAnnouncement> {
        validate_fields(&self.description, &self.phone, &self.delete_password)?;

        let post_type = PostType::from_str(&self.post_type)
            .ok_or_else(|| AppError::InvalidFormat("Please choose Lost or Found.".to_string()))?;
        let category = Category::from_str(&self.category)
            .ok_or_else(|| AppError::InvalidFormat("Please choose a category.".to_string()))?;
        let city = City::from_str(&self.city)
            .ok_or_else(|| AppError::InvalidFormat("Please choose a city or area.".to_string()))?;

        let event_date = match self.event_date.trim() {
            "" => today,
            raw => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                AppError::InvalidFormat("Please enter a valid date.".to_string())
            })?,
        };

        Ok(NewAnnouncement {
            post_type,
            category,
            city,
            description: self.description.clone(),
            event_date,
            phone: self.phone.clone(),
            delete_password: self.delete_password.clone(),
        })
    }

    fn render(&self, notice: Option<Notice>, status: StatusCode) -> Response {
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        let default_type = PostType::Lost;
        let post_type = if self.post_type.is_empty() {
            default_type.label()
        } else {
            self.post_type.as_str()
        };

        let template = PostTemplate {
            notice,
            type_options: PostType::ALL
                .iter()
                .map(|t| SelectOption::new(t.label(), t.label(), post_type))
                .collect(),
            category_options: Category::ALL
                .iter()
                .map(|c| SelectOption::new(c.as_str(), c.as_str(), &self.category))
                .collect(),
            city_options: City::ALL
                .iter()
                .map(|c| SelectOption::new(c.as_str(), c.as_str(), &self.city))
                .collect(),
            description: self.description.clone(),
            event_date: if self.event_date.is_empty() { today } else { self.event_date.clone() },
            phone: self.phone.clone(),
            accept: ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| format!(".{}", ext))
                .collect::<Vec<_>>()
                .join(","),
        };

        (status, HtmlTemplate(template)).into_response()
    }
}

// GET /
pub async fn post_page(Query(query): Query<NoticeQuery>) -> impl IntoResponse {
    let notice = query.notice.as_deref().and_then(Notice::from_code);
    PostForm::default().render(notice, StatusCode::OK)
}

// POST /
pub async fn submit_post(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let mut form = PostForm::default();
    let mut images = Vec::new();

    if let Err(e) = read_post_form(&mut multipart, &mut form, &mut images).await {
        return form.render(Some(Notice::error(e.to_string())), e.status_code());
    }

    let submission = match form.to_submission(Local::now().date_naive()) {
        Ok(submission) => submission,
        Err(e) => return form.render(Some(Notice::error(e.to_string())), e.status_code()),
    };

    match state.service_context.announcement_service.submit(submission, images).await {
        Ok(_) => redirect_after_change("/?notice=posted"),
        Err(e) if e.is_user_error() => {
            form.render(Some(Notice::error(e.to_string())), e.status_code())
        }
        Err(e) => {
            tracing::error!("Failed to post announcement: {}", e);
            form.render(
                Some(Notice::error("Could not save the announcement. Please try again.")),
                e.status_code(),
            )
        }
    }
}

/// Reads every multipart field. A part that cannot be read aborts the
/// whole submission.
async fn read_post_form(
    multipart: &mut Multipart,
    form: &mut PostForm,
    images: &mut Vec<UploadedImage>,
) -> Result<()> {
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "post_type" => form.post_type = field.text().await.map_err(upload_error)?,
            "category" => form.category = field.text().await.map_err(upload_error)?,
            "city" => form.city = field.text().await.map_err(upload_error)?,
            "description" => form.description = field.text().await.map_err(upload_error)?,
            "event_date" => form.event_date = field.text().await.map_err(upload_error)?,
            "phone" => form.phone = field.text().await.map_err(upload_error)?,
            "delete_password" => {
                form.delete_password = field.text().await.map_err(upload_error)?
            }
            "images" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(upload_error)?;
                if !file_name.is_empty() && !data.is_empty() {
                    images.push(UploadedImage { file_name, data: data.to_vec() });
                }
            }
            _ => {
                field.bytes().await.map_err(upload_error)?;
            }
        }
    }

    Ok(())
}

fn upload_error(err: MultipartError) -> AppError {
    tracing::warn!("Unreadable post form upload: {}", err);
    AppError::InvalidFormat(
        "The upload could not be read. Photos may be too large; please try again.".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> PostForm {
        PostForm {
            post_type: "Found".to_string(),
            category: "Jewelry".to_string(),
            city: "Ahmadi".to_string(),
            description: "Silver ring".to_string(),
            event_date: "2024-05-17".to_string(),
            phone: "12345678".to_string(),
            delete_password: "pw".to_string(),
        }
    }

    #[test]
    fn test_form_to_submission() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let submission = form().to_submission(today).unwrap();
        assert_eq!(submission.post_type, PostType::Found);
        assert_eq!(submission.category, Category::Jewelry);
        assert_eq!(submission.city, City::Ahmadi);
        assert_eq!(submission.event_date, NaiveDate::from_ymd_opt(2024, 5, 17).unwrap());
    }

    #[test]
    fn test_blank_event_date_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let submission = PostForm { event_date: String::new(), ..form() }
            .to_submission(today)
            .unwrap();
        assert_eq!(submission.event_date, today);
    }

    #[test]
    fn test_free_text_errors_come_before_choice_and_date_errors() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let messy = PostForm {
            description: "  ".to_string(),
            event_date: "not-a-date".to_string(),
            city: "Paris".to_string(),
            phone: "1".to_string(),
            delete_password: String::new(),
            ..form()
        };
        let err = messy.to_submission(today).unwrap_err();
        assert!(matches!(err, AppError::MissingField(ref m) if m.contains("description")));

        let err = PostForm { description: "ring".to_string(), ..messy.clone() }
            .to_submission(today)
            .unwrap_err();
        assert!(err.to_string().contains("Phone number"));

        let err = PostForm { event_date: "not-a-date".to_string(), ..form() }
            .to_submission(today)
            .unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid date.");
    }

    #[test]
    fn test_unknown_city_is_rejected() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let err = PostForm { city: "Paris".to_string(), ..form() }
            .to_submission(today)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFormat(_)));
    }
}
