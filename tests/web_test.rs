mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
};
use common::{submission, TestBoard};
use lostfound::{
    domain::{City, PostType},
    repository::AnnouncementRepository,
};
use serde_json::Value;
use tower::ServiceExt;

async fn body_text(response: Response) -> anyhow::Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

fn multipart_body(boundary: &str, fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                boundary, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                boundary, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}

fn post_form_request(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Request<Body> {
    let boundary = "lostfound-test-boundary";
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(multipart_body(boundary, fields, file)))
        .expect("valid request")
}

const VALID_FIELDS: [(&str, &str); 7] = [
    ("post_type", "Lost"),
    ("category", "Pets"),
    ("city", "Salmiya"),
    ("description", "Grey cat with a red collar"),
    ("event_date", "2024-05-17"),
    ("phone", "12345678"),
    ("delete_password", "meow"),
];

#[tokio::test]
async fn test_health_check() -> anyhow::Result<()> {
    let board = TestBoard::new();
    let response = board.app()
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(response).await?)?;
    assert_eq!(json["status"], "healthy");
    Ok(())
}

#[tokio::test]
async fn test_post_page_renders_form() -> anyhow::Result<()> {
    let board = TestBoard::new();
    let response = board.app()
        .oneshot(Request::builder().uri("/?notice=posted").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await?;
    assert!(html.contains("Post a Lost or Found Item Announcement"));
    assert!(html.contains("Announcement posted successfully!"));
    assert!(html.contains("Mubarak Al-Kabeer"));
    Ok(())
}

#[tokio::test]
async fn test_submit_form_redirects_and_persists() -> anyhow::Result<()> {
    let board = TestBoard::new();
    let response = board.app()
        .oneshot(post_form_request(&VALID_FIELDS, Some(("cat.png", b"\x89PNG"))))
        .await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/?notice=posted");

    let stored = board.reopen().load().await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].post_type, PostType::Lost);
    assert_eq!(stored[0].city, City::Salmiya);
    assert_eq!(stored[0].event_date, "2024-05-17");
    assert_eq!(stored[0].image_paths().count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_submit_form_with_bad_phone_shows_error() -> anyhow::Result<()> {
    let board = TestBoard::new();
    let mut fields = VALID_FIELDS;
    fields[5] = ("phone", "1234567");

    let response = board.app().oneshot(post_form_request(&fields, None)).await?;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await?;
    assert!(html.contains("Phone number must be exactly 8 digits."));
    // The description survives the round trip back to the form
    assert!(html.contains("Grey cat with a red collar"));
    assert!(board.reopen().load().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_truncated_upload_is_rejected() -> anyhow::Result<()> {
    let board = TestBoard::new();
    let boundary = "lostfound-test-boundary";
    let mut body = multipart_body(boundary, &VALID_FIELDS, None);
    // Drop the closing boundary and start a photo part that never ends
    body.truncate(body.len() - format!("--{}--\r\n", boundary).len());
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"cat.png\"\r\n\r\n",
            boundary
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"\x89PNG half a photo");

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))?;
    let response = board.app().oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await?;
    assert!(html.contains("The upload could not be read."));
    assert!(board.reopen().load().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_submit_form_reports_description_before_date() -> anyhow::Result<()> {
    let board = TestBoard::new();
    let mut fields = VALID_FIELDS;
    fields[3] = ("description", "");
    fields[4] = ("event_date", "someday");
    fields[5] = ("phone", "1");
    fields[6] = ("delete_password", "");

    let response = board.app().oneshot(post_form_request(&fields, None)).await?;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await?;
    assert!(html.contains("Please enter a description."));
    assert!(!html.contains("Please enter a valid date."));
    Ok(())
}

#[tokio::test]
async fn test_browse_with_unknown_city_lists_nothing() -> anyhow::Result<()> {
    let board = TestBoard::new();
    let mut post = submission(PostType::Lost, City::Salmiya, (2024, 5, 17));
    post.description = "Blue umbrella".to_string();
    board.context.announcement_service.submit(post, Vec::new()).await?;

    let response = board.app()
        .oneshot(Request::builder().uri("/announcements?city=Paris").body(Body::empty())?)
        .await?;

    let html = body_text(response).await?;
    assert!(!html.contains("Blue umbrella"));
    assert!(html.contains("No announcements match the selected criteria."));
    Ok(())
}

#[tokio::test]
async fn test_browse_page_lists_newest_first() -> anyhow::Result<()> {
    let board = TestBoard::new();
    let service = &board.context.announcement_service;
    let mut first = submission(PostType::Lost, City::Salmiya, (2024, 5, 17));
    first.description = "First post".to_string();
    let mut second = submission(PostType::Found, City::Salmiya, (2024, 5, 18));
    second.description = "Second post".to_string();
    service.submit(first, Vec::new()).await?;
    service.submit(second, Vec::new()).await?;

    let response = board.app()
        .oneshot(Request::builder().uri("/announcements?city=Salmiya").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await?;
    let first_at = html.find("First post").expect("first post listed");
    let second_at = html.find("Second post").expect("second post listed");
    assert!(second_at < first_at);
    Ok(())
}

#[tokio::test]
async fn test_browse_page_reports_empty_result() -> anyhow::Result<()> {
    let board = TestBoard::new();
    let response = board.app()
        .oneshot(Request::builder().uri("/announcements?city=Jahra").body(Body::empty())?)
        .await?;

    let html = body_text(response).await?;
    assert!(html.contains("No announcements match the selected criteria."));
    Ok(())
}

#[tokio::test]
async fn test_delete_form_with_wrong_password_keeps_record() -> anyhow::Result<()> {
    let board = TestBoard::new();
    board.context.announcement_service
        .submit(submission(PostType::Lost, City::Salmiya, (2024, 5, 17)), Vec::new())
        .await?;

    let response = board.app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/announcements/1/delete")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("password=nope&filters=city%3DSalmiya"))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/announcements?city=Salmiya&notice=bad_password"
    );
    assert_eq!(board.reopen().load().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_resolve_form_with_correct_password() -> anyhow::Result<()> {
    let board = TestBoard::new();
    board.context.announcement_service
        .submit(submission(PostType::Lost, City::Salmiya, (2024, 5, 17)), Vec::new())
        .await?;

    let response = board.app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/announcements/1/resolve")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("password=hunter2&filters="))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/announcements?notice=resolved");
    assert!(board.reopen().load().await?[0].resolved);
    Ok(())
}

#[tokio::test]
async fn test_api_lists_without_passwords() -> anyhow::Result<()> {
    let board = TestBoard::new();
    let service = &board.context.announcement_service;
    service.submit(submission(PostType::Lost, City::Salmiya, (2024, 5, 17)), Vec::new()).await?;
    service.submit(submission(PostType::Found, City::Salmiya, (2024, 6, 1)), Vec::new()).await?;

    let response = board.app()
        .oneshot(
            Request::builder()
                .uri("/api/announcements?date_mode=month&year=2024&month=5")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(response).await?)?;
    let list = json.as_array().expect("array");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["event_date"], "2024-05-17");
    assert_eq!(list[0]["type"], "lost");
    assert!(list[0].get("delete_password").is_none());
    Ok(())
}

#[tokio::test]
async fn test_api_moderation_status_codes() -> anyhow::Result<()> {
    let board = TestBoard::new();
    board.context.announcement_service
        .submit(submission(PostType::Lost, City::Salmiya, (2024, 5, 17)), Vec::new())
        .await?;

    let json_request = |uri: &str, password: &str| {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::json!({ "password": password }).to_string()))
    };

    let response = board.app().oneshot(json_request("/api/announcements/1/resolve", "bad")?).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = board.app().oneshot(json_request("/api/announcements/9/resolve", "bad")?).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = board.app()
        .oneshot(json_request("/api/announcements/1/resolve", "hunter2")?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(response).await?)?;
    assert_eq!(json["resolved"], true);

    let response = board.app()
        .oneshot(json_request("/api/announcements/1/delete", "hunter2")?)
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(board.reopen().load().await?.is_empty());
    Ok(())
}
