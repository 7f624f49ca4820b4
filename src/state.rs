use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::{AppConfig, SessionConfig};
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = db::connect(&config.database_path).await?;
        db::init_schema(&db).await?;
        Ok(Self {
            db,
            config: Arc::new(config),
        })
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    /// State backed by a fresh in-memory store, for tests.
    pub async fn for_tests() -> Self {
        let db = db::connect_in_memory().await.expect("in-memory sqlite");
        db::init_schema(&db).await.expect("init schema");

        let config = Arc::new(AppConfig {
            database_path: ":memory:".into(),
            session: SessionConfig {
                secret: "test-secret".into(),
                issuer: "quizzy-test".into(),
                ttl_minutes: 5,
                remember_ttl_minutes: 60,
            },
        });

        Self { db, config }
    }
}
