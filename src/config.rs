use std::path::PathBuf;

use serde::Deserialize;

/// Settings for signed session tokens and their cookies.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_minutes: i64,
    pub remember_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| "quizzy.db".into())
            .into();
        let session = SessionConfig {
            secret: std::env::var("SECRET_KEY")?,
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "quizzy".into()),
            ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(120),
            remember_ttl_minutes: std::env::var("SESSION_REMEMBER_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 30),
        };
        Ok(Self {
            database_path,
            session,
        })
    }
}
