use axum::{
    extract::{FromRef, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::auth::dto::{LoginForm, SignupForm};
use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::pages::render;
use crate::session::{Flash, SessionKeys};
use crate::state::AppState;
use crate::users::repo::{is_unique_violation, User};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/signup", get(signup_page).post(signup))
        .route("/logout", get(logout))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[instrument(skip(jar))]
pub async fn login_page(jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, flash) = Flash::take(jar);
    let notice = flash.map(|f| (f.level(), f.message()));
    (jar, Html(render::login_page(notice)))
}

#[instrument(skip(state, jar, form))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let (email, password) = match (present(&form.email), present(&form.password)) {
        (Some(email), Some(password)) => (email, password),
        _ => return Ok(login_error("Please fill in all fields.")),
    };

    let user = User::find_by_email(&state.db, email).await?;
    let verified = match &user {
        Some(user) => verify_password(password, &user.password_hash)?,
        None => false,
    };

    // Unknown email and wrong password are indistinguishable to the caller.
    let user = match user {
        Some(user) if verified => user,
        _ => {
            warn!(email, "login rejected");
            return Ok(login_error("Invalid email or password."));
        }
    };

    let remember = form.remember.is_some();
    let name = format!("{} {}", user.first_name, user.last_name);
    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(user.id, &name, &user.email, remember)?;
    let jar = jar
        .add(keys.cookie(token, remember))
        .add(Flash::LoginSuccess.cookie());

    info!(user_id = user.id, "user logged in");
    Ok((jar, Redirect::to("/")).into_response())
}

#[instrument]
pub async fn signup_page() -> Html<String> {
    Html(render::signup_page(None))
}

#[instrument(skip(state, jar, form))]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let (first_name, last_name, email, password, confirm) = match (
        present(&form.first_name),
        present(&form.last_name),
        present(&form.email),
        present(&form.password),
        present(&form.confirm_password),
    ) {
        (Some(a), Some(b), Some(c), Some(d), Some(e)) => (a, b, c, d, e),
        _ => return Ok(signup_error("Please fill in all fields.")),
    };

    if password != confirm {
        return Ok(signup_error("Passwords do not match."));
    }
    if password.len() < 6 {
        return Ok(signup_error("Password must be at least 6 characters long."));
    }
    if form.terms.is_none() {
        return Ok(signup_error("Please agree to the Terms & Conditions."));
    }
    if !is_valid_email(email) {
        return Ok(signup_error("Please enter a valid email address."));
    }

    let hash = hash_password(password)?;
    let user = match User::create(&state.db, first_name, last_name, email, &hash).await {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            warn!(email, "signup with existing email");
            return Ok(signup_error(
                "Email already exists. Please use a different email.",
            ));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(AppError::Database(e));
        }
    };

    let name = format!("{} {}", user.first_name, user.last_name);
    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(user.id, &name, &user.email, false)?;
    let jar = jar
        .add(keys.cookie(token, false))
        .add(Flash::SignupSuccess.cookie());

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((jar, Redirect::to("/")).into_response())
}

#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar
        .remove(SessionKeys::removal_cookie())
        .add(Flash::LoggedOut.cookie());
    (jar, Redirect::to("/login"))
}

fn login_error(message: &str) -> Response {
    Html(render::login_page(Some(("error", message)))).into_response()
}

fn signup_error(message: &str) -> Response {
    Html(render::signup_page(Some(("error", message)))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format_check() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@uni.edu"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("spaces in@x.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn present_treats_empty_as_missing() {
        assert_eq!(present(&Some("value".into())), Some("value"));
        assert_eq!(present(&Some(String::new())), None);
        assert_eq!(present(&None), None);
    }
}
