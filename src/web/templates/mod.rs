use askama::Template;
use axum::{
    response::{Html, IntoResponse, Response},
    http::{header, StatusCode},
};

/// A one-off message shown at the top of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// `success`, `error` or `info`; doubles as the CSS class
    pub kind: &'static str,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: "success", message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: "error", message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: "info", message: message.into() }
    }

    /// Notices carried across a redirect as a short code in the query string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "posted" => Some(Self::success("Announcement posted successfully!")),
            "resolved" => Some(Self::success("Post marked as resolved.")),
            "deleted" => Some(Self::success("Post deleted successfully.")),
            "bad_password" => Some(Self::error("Incorrect password.")),
            "not_found" => Some(Self::error("That announcement no longer exists.")),
            _ => None,
        }
    }
}

/// An `<option>` in a select box
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>, current: &str) -> Self {
        let value = value.into();
        let selected = value == current;
        Self { value, label: label.into(), selected }
    }
}

// Make askama templates work with axum
pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            ).into_response(),
        }
    }
}

/// 303 to `location` after a mutation so the browser reloads the view.
/// The body covers clients that do not follow redirects.
pub fn redirect_after_change(location: &str) -> Response {
    let href = location.replace('&', "&amp;").replace('"', "&quot;");
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, location.to_string())],
        Html(format!(
            r#"<p>Please refresh manually to see changes. <a href="{}">Continue</a></p>"#,
            href
        )),
    ).into_response()
}
