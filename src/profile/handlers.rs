use axum::{
    extract::{DefaultBodyLimit, FromRef, Multipart, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};

use crate::error::AppError;
use crate::pages::{self, render};
use crate::profile::dto::{ProfileUpdateForm, UpdateResult, UploadResult};
use crate::session::{Session, SessionKeys};
use crate::state::AppState;
use crate::users::repo::{ProfileUpdate, User};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024; // 10MB

/// Where the stored avatar is served from.
pub const PROFILE_IMAGE_URL: &str = "/profile_image";

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile_page))
        .route("/update_profile", post(update_profile))
        .route("/upload_profile_image", post(upload_profile_image))
        .route("/profile_image", get(profile_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

#[instrument(skip(state, session, headers))]
pub async fn profile_page(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let user = User::find_by_id(&state.db, session.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account no longer exists.".into()))?;

    if pages::is_ajax(&headers) {
        Ok(Html(render::profile_fragment(&user)))
    } else {
        Ok(Html(render::page_shell(&user, None)))
    }
}

#[instrument(skip(state, session, jar, form))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Form(form): Form<ProfileUpdateForm>,
) -> Result<(CookieJar, Json<UpdateResult>), AppError> {
    let (first_name, last_name) = match (trimmed(&form.first_name), trimmed(&form.last_name)) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(AppError::Validation(
                "First name and last name are required.".into(),
            ))
        }
    };

    let fields = ProfileUpdate {
        first_name,
        last_name,
        phone: trimmed(&form.phone),
        grade: trimmed(&form.grade),
        graduation_year: trimmed(&form.graduation_year),
        nationality: trimmed(&form.nationality),
        university: trimmed(&form.university),
    };
    let rows = User::update_profile(&state.db, session.user_id, &fields).await?;
    if rows == 0 {
        warn!(user_id = session.user_id, "profile update matched no row");
        return Err(AppError::NotFound("Account no longer exists.".into()));
    }

    // Keep the session's denormalized display name current.
    let name = format!("{} {}", first_name, last_name);
    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(session.user_id, &name, &session.email, session.remember)?;
    let jar = jar.add(keys.cookie(token, session.remember));

    info!(user_id = session.user_id, rows, "profile updated");
    Ok((
        jar,
        Json(UpdateResult {
            success: true,
            message: "Profile updated successfully!".into(),
        }),
    ))
}

#[instrument(skip(state, session, multipart))]
pub async fn upload_profile_image(
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> Result<Json<UploadResult>, AppError> {
    let mut upload: Option<(String, bytes::Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some("profile_image") {
            continue;
        }
        let filename = field.file_name().unwrap_or("").to_string();
        if filename.is_empty() {
            return Err(AppError::Validation("No file selected".into()));
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read uploaded file: {e}")))?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) = match upload {
        Some(upload) => upload,
        None => return Err(AppError::Validation("No file uploaded".into())),
    };

    let mime = mime_for_filename(&filename);
    let rows = User::set_avatar(&state.db, session.user_id, &data, &mime).await?;
    if rows == 0 {
        warn!(user_id = session.user_id, "avatar update matched no row");
        return Err(AppError::NotFound("Account no longer exists.".into()));
    }

    info!(
        user_id = session.user_id,
        filename = %filename,
        mime = %mime,
        size = data.len(),
        "avatar stored"
    );
    Ok(Json(UploadResult {
        success: true,
        image_url: PROFILE_IMAGE_URL.into(),
    }))
}

#[instrument(skip(state, session))]
pub async fn profile_image(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    match User::fetch_avatar(&state.db, session.user_id).await? {
        Some((bytes, mime)) => Ok(([(header::CONTENT_TYPE, mime)], bytes).into_response()),
        None => Err(AppError::NotFound("No profile image uploaded.".into())),
    }
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Derive the image MIME type from the uploaded filename. Files without an
/// extension are treated as JPEG.
fn mime_for_filename(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            if ext == "svg" {
                "image/svg+xml".to_string()
            } else {
                format!("image/{ext}")
            }
        }
        _ => "image/jpeg".to_string(),
    }
}
