use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use crate::session::flash::Flash;
use crate::session::keys::{SessionKeys, SESSION_COOKIE};

/// Authenticated session for the current request.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub remember: bool,
}

/// Rejection for protected routes: back to the login page with a notice.
/// The wrapped handler never runs.
pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        let jar = CookieJar::new().add(Flash::LoginRequired.cookie());
        (jar, Redirect::to("/login")).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_owned())
            .ok_or(AuthRedirect)?;

        let claims = keys.verify(&token).map_err(|_| {
            warn!("invalid or expired session token");
            AuthRedirect
        })?;

        Ok(Session {
            user_id: claims.sub,
            name: claims.name,
            email: claims.email,
            remember: claims.remember,
        })
    }
}
