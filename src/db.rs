use std::path::Path;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub async fn connect(path: &Path) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
        .context("connect to sqlite database")?;
    Ok(pool)
}

/// A single connection keeps every query on the same in-memory database.
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .context("connect to in-memory sqlite")?;
    Ok(pool)
}

/// Create the users table if it does not exist. Safe to run on every start.
pub async fn init_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name      TEXT NOT NULL,
            last_name       TEXT NOT NULL,
            email           TEXT NOT NULL UNIQUE,
            password_hash   TEXT NOT NULL,
            phone           TEXT,
            grade           TEXT,
            graduation_year TEXT,
            nationality     TEXT,
            university      TEXT,
            avatar          BLOB,
            avatar_mime     TEXT,
            created_at      TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("create users table")?;
    Ok(())
}
