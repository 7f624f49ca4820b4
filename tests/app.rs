use axum::{
    body::{to_bytes, Body},
    extract::FromRef,
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use quizzy::app::build_app;
use quizzy::session::{SessionKeys, SESSION_COOKIE};
use quizzy::state::AppState;

async fn test_app() -> (Router, AppState) {
    let state = AppState::for_tests().await;
    (build_app(state.clone()), state)
}

fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

/// Pull the session cookie out of a response's Set-Cookie headers, as a
/// `name=value` pair ready for a Cookie request header.
fn session_cookie(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(SESSION_COOKIE))
        .map(|v| v.split(';').next().unwrap_or(v).to_string())
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    String::from_utf8_lossy(&bytes).to_string()
}

const SIGNUP_ANN: &str = "first_name=Ann&last_name=Lee&email=a%40x.com\
    &password=secret1&confirm_password=secret1&terms=on";

async fn signup_ann(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(form_request("/signup", SIGNUP_ANN, None))
        .await
        .expect("response");
    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/");
    session_cookie(&response).expect("session cookie set on signup")
}

#[tokio::test]
async fn protected_routes_redirect_to_login() {
    let (app, _state) = test_app().await;

    for uri in [
        "/",
        "/overview",
        "/analysis",
        "/createQuiz",
        "/quizPage",
        "/home",
        "/profile",
        "/profile_image",
    ] {
        let response = app
            .clone()
            .oneshot(get_request(uri, None))
            .await
            .expect("response");
        assert!(
            response.status().is_redirection(),
            "{uri} should redirect without a session"
        );
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    let response = app
        .clone()
        .oneshot(form_request("/update_profile", "first_name=A&last_name=B", None))
        .await
        .expect("response");
    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn health_is_open() {
    let (app, _state) = test_app().await;
    let response = app
        .oneshot(get_request("/health", None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn signup_establishes_a_session() {
    let (app, state) = test_app().await;
    let cookie = signup_ann(&app).await;

    let response = app
        .clone()
        .oneshot(get_request("/", Some(&cookie)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Ann Lee"));
    assert!(html.contains("a@x.com"));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db)
        .await
        .expect("count");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn duplicate_signup_gets_the_dedicated_error() {
    let (app, state) = test_app().await;
    signup_ann(&app).await;

    let response = app
        .clone()
        .oneshot(form_request("/signup", SIGNUP_ANN, None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Email already exists. Please use a different email."));
    assert!(!html.contains("A database error occurred."));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db)
        .await
        .expect("count");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn signup_validation_order() {
    let (app, _state) = test_app().await;

    let cases = [
        (
            "first_name=Ann&last_name=Lee&email=a%40x.com&password=secret1",
            "Please fill in all fields.",
        ),
        (
            "first_name=Ann&last_name=Lee&email=a%40x.com\
             &password=secret1&confirm_password=other22&terms=on",
            "Passwords do not match.",
        ),
        (
            "first_name=Ann&last_name=Lee&email=a%40x.com\
             &password=abc&confirm_password=abc&terms=on",
            "Password must be at least 6 characters long.",
        ),
        (
            "first_name=Ann&last_name=Lee&email=a%40x.com\
             &password=secret1&confirm_password=secret1",
            "Please agree to the Terms &amp; Conditions.",
        ),
        (
            "first_name=Ann&last_name=Lee&email=nonsense\
             &password=secret1&confirm_password=secret1&terms=on",
            "Please enter a valid email address.",
        ),
    ];

    for (body, expected) in cases {
        let response = app
            .clone()
            .oneshot(form_request("/signup", body, None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains(expected), "expected {expected:?} for {body:?}");
    }
}

#[tokio::test]
async fn login_after_signup_succeeds() {
    let (app, _state) = test_app().await;
    signup_ann(&app).await;

    let response = app
        .clone()
        .oneshot(form_request(
            "/login",
            "email=a%40x.com&password=secret1&remember=on",
            None,
        ))
        .await
        .expect("response");
    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/");
    let cookie = session_cookie(&response).expect("session cookie");

    let response = app
        .clone()
        .oneshot(get_request("/", Some(&cookie)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let (app, _state) = test_app().await;
    signup_ann(&app).await;

    let wrong_password = app
        .clone()
        .oneshot(form_request(
            "/login",
            "email=a%40x.com&password=wrong11",
            None,
        ))
        .await
        .expect("response");
    let unknown_email = app
        .clone()
        .oneshot(form_request(
            "/login",
            "email=nobody%40x.com&password=secret1",
            None,
        ))
        .await
        .expect("response");

    assert_eq!(wrong_password.status(), StatusCode::OK);
    assert_eq!(unknown_email.status(), StatusCode::OK);
    let a = body_string(wrong_password).await;
    let b = body_string(unknown_email).await;
    assert_eq!(a, b);
    assert!(a.contains("Invalid email or password."));
}

#[tokio::test]
async fn logout_redirects_to_login() {
    let (app, _state) = test_app().await;
    let cookie = signup_ann(&app).await;

    let response = app
        .clone()
        .oneshot(get_request("/logout", Some(&cookie)))
        .await
        .expect("response");
    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn update_profile_validates_required_names() {
    let (app, state) = test_app().await;
    let cookie = signup_ann(&app).await;

    let response = app
        .clone()
        .oneshot(form_request(
            "/update_profile",
            "first_name=&last_name=Lee&phone=555-0100",
            Some(&cookie),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json: serde_json::Value =
        serde_json::from_str(&body_string(response).await).expect("json");
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "First name and last name are required.");

    // Nothing was mutated.
    let (first, phone): (String, Option<String>) =
        sqlx::query_as("SELECT first_name, phone FROM users WHERE email = 'a@x.com'")
            .fetch_one(&state.db)
            .await
            .expect("row");
    assert_eq!(first, "Ann");
    assert_eq!(phone, None);
}

#[tokio::test]
async fn update_profile_applies_fields() {
    let (app, state) = test_app().await;
    let cookie = signup_ann(&app).await;

    let response = app
        .clone()
        .oneshot(form_request(
            "/update_profile",
            "first_name=Anna&last_name=Lee&phone=555-0100\
             &graduation_year=2027&university=MIT",
            Some(&cookie),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value =
        serde_json::from_str(&body_string(response).await).expect("json");
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Profile updated successfully!");

    let (first, university): (String, Option<String>) =
        sqlx::query_as("SELECT first_name, university FROM users WHERE email = 'a@x.com'")
            .fetch_one(&state.db)
            .await
            .expect("row");
    assert_eq!(first, "Anna");
    assert_eq!(university.as_deref(), Some("MIT"));
}

#[tokio::test]
async fn update_profile_for_vanished_account_fails() {
    let (app, state) = test_app().await;

    let keys = SessionKeys::from_ref(&state);
    let token = keys
        .sign(999, "Ghost User", "ghost@x.com", false)
        .expect("sign");
    let cookie = format!("{SESSION_COOKIE}={token}");

    let response = app
        .clone()
        .oneshot(form_request(
            "/update_profile",
            "first_name=Ghost&last_name=User",
            Some(&cookie),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json: serde_json::Value =
        serde_json::from_str(&body_string(response).await).expect("json");
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn avatar_upload_roundtrip() {
    let (app, _state) = test_app().await;
    let cookie = signup_ann(&app).await;

    let boundary = "quizzy-test-boundary";
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"></svg>"#;
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"profile_image\"; filename=\"avatar.svg\"\r\n\
         Content-Type: image/svg+xml\r\n\r\n\
         {svg}\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/upload_profile_image")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(header::COOKIE, cookie.as_str())
        .body(Body::from(body))
        .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value =
        serde_json::from_str(&body_string(response).await).expect("json");
    assert_eq!(json["success"], true);
    assert_eq!(json["image_url"], "/profile_image");

    // The stored bytes come back under the recorded MIME type.
    let response = app
        .clone()
        .oneshot(get_request("/profile_image", Some(&cookie)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
    assert_eq!(body_string(response).await, svg);
}

#[tokio::test]
async fn avatar_upload_without_file_fails() {
    let (app, _state) = test_app().await;
    let cookie = signup_ann(&app).await;

    let boundary = "quizzy-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"unrelated\"\r\n\r\n\
         value\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/upload_profile_image")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(header::COOKIE, cookie.as_str())
        .body(Body::from(body))
        .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json: serde_json::Value =
        serde_json::from_str(&body_string(response).await).expect("json");
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "No file uploaded");
}

#[tokio::test]
async fn stub_routes_negotiate_on_request_header() {
    let (app, _state) = test_app().await;
    let cookie = signup_ann(&app).await;

    let request = Request::builder()
        .method("GET")
        .uri("/overview")
        .header(header::COOKIE, cookie.as_str())
        .header("x-requested-with", "XMLHttpRequest")
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let fragment = body_string(response).await;
    assert!(fragment.contains(r#"<section id="overview">"#));
    assert!(!fragment.contains("<html>"));

    let response = app
        .clone()
        .oneshot(get_request("/overview", Some(&cookie)))
        .await
        .expect("response");
    let page = body_string(response).await;
    assert!(page.contains("<html>"));
    assert!(page.contains("Ann Lee"));
}

#[tokio::test]
async fn profile_fragment_shows_the_user_row() {
    let (app, _state) = test_app().await;
    let cookie = signup_ann(&app).await;

    let request = Request::builder()
        .method("GET")
        .uri("/profile")
        .header(header::COOKIE, cookie.as_str())
        .header("x-requested-with", "XMLHttpRequest")
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains(r#"value="Ann""#));
    assert!(html.contains(r#"value="Lee""#));
    assert!(html.contains("a@x.com"));
}
