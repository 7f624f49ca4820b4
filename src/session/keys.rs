use std::time::Duration;

use axum::extract::FromRef;
use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::config::SessionConfig;
use crate::session::claims::SessionClaims;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "quizzy_session";

/// Holds signing and verification keys for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl: Duration,
    remember_ttl: Duration,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        let SessionConfig {
            secret,
            issuer,
            ttl_minutes,
            remember_ttl_minutes,
        } = state.config.session.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl: Duration::from_secs((ttl_minutes as u64) * 60),
            remember_ttl: Duration::from_secs((remember_ttl_minutes as u64) * 60),
        }
    }
}

impl SessionKeys {
    pub fn sign(
        &self,
        user_id: i64,
        name: &str,
        email: &str,
        remember: bool,
    ) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = if remember { self.remember_ttl } else { self.ttl };
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = SessionClaims {
            sub: user_id,
            name: name.to_string(),
            email: email.to_string(),
            remember,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id, remember, "session token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    /// Build the session cookie. A remembered session gets a persistent
    /// Max-Age; otherwise the cookie lives for the browser session only.
    pub fn cookie(&self, token: String, remember: bool) -> Cookie<'static> {
        let mut builder = Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);
        if remember {
            builder = builder.max_age(TimeDuration::seconds(self.remember_ttl.as_secs() as i64));
        }
        builder.build()
    }

    pub fn removal_cookie() -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, "")).path("/").build()
    }
}
