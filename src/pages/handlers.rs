use axum::{extract::State, http::HeaderMap, response::Html, routing::get, Router};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;

use crate::error::AppError;
use crate::pages::render;
use crate::session::{Flash, Session};
use crate::state::AppState;
use crate::users::repo::User;

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/overview", get(overview))
        .route("/analysis", get(analysis))
        .route("/createQuiz", get(create_quiz))
        .route("/quizPage", get(quiz_page))
        .route("/home", get(home))
}

/// The front-end marks fragment requests with this header.
pub fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        == Some("XMLHttpRequest")
}

async fn load_user(state: &AppState, session: &Session) -> Result<User, AppError> {
    User::find_by_id(&state.db, session.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account no longer exists.".into()))
}

#[instrument(skip(state, session, jar))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), AppError> {
    let user = load_user(&state, &session).await?;
    let (jar, flash) = Flash::take(jar);
    Ok((jar, Html(render::page_shell(&user, flash))))
}

async fn stub_page(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
    fragment: String,
) -> Result<Html<String>, AppError> {
    if is_ajax(headers) {
        return Ok(Html(fragment));
    }
    let user = load_user(state, session).await?;
    Ok(Html(render::page_shell(&user, None)))
}

#[instrument(skip(state, session, headers))]
pub async fn overview(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    stub_page(&state, &session, &headers, render::overview_fragment()).await
}

#[instrument(skip(state, session, headers))]
pub async fn analysis(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    stub_page(&state, &session, &headers, render::analysis_fragment()).await
}

#[instrument(skip(state, session, headers))]
pub async fn create_quiz(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    stub_page(&state, &session, &headers, render::create_quiz_fragment()).await
}

#[instrument(skip(state, session, headers))]
pub async fn quiz_page(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    stub_page(&state, &session, &headers, render::quiz_page_fragment()).await
}

#[instrument(skip(state, session, headers))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    stub_page(&state, &session, &headers, render::home_fragment()).await
}
