use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

/// Account row without the avatar payload. The avatar is loaded separately
/// so routine lookups stay small.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub grade: Option<String>,
    pub graduation_year: Option<String>,
    pub nationality: Option<String>,
    pub university: Option<String>,
    pub has_avatar: bool,
    pub created_at: OffsetDateTime,
}

/// Mutable profile fields applied by the profile editor.
#[derive(Debug)]
pub struct ProfileUpdate<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: Option<&'a str>,
    pub grade: Option<&'a str>,
    pub graduation_year: Option<&'a str>,
    pub nationality: Option<&'a str>,
    pub university: Option<&'a str>,
}

const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, phone, grade, \
     graduation_year, nationality, university, avatar IS NOT NULL AS has_avatar, created_at";

impl User {
    /// Find a user by email. The lookup is case-sensitive, matching how
    /// emails are stored.
    pub async fn find_by_email(db: &SqlitePool, email: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    /// Insert a new account with a hashed password. Returns the raw store
    /// error so callers can tell a duplicate email apart from other failures
    /// with [`is_unique_violation`].
    pub async fn create(
        db: &SqlitePool,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        let sql = format!(
            "INSERT INTO users (first_name, last_name, email, password_hash, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .bind(password_hash)
            .bind(OffsetDateTime::now_utc())
            .fetch_one(db)
            .await
    }

    /// Apply the profile editor's fields. Returns the number of rows
    /// affected; zero means the account no longer exists.
    pub async fn update_profile(
        db: &SqlitePool,
        id: i64,
        fields: &ProfileUpdate<'_>,
    ) -> anyhow::Result<u64> {
        let result = sqlx::query(
            "UPDATE users \
             SET first_name = ?, last_name = ?, phone = ?, grade = ?, \
                 graduation_year = ?, nationality = ?, university = ? \
             WHERE id = ?",
        )
        .bind(fields.first_name)
        .bind(fields.last_name)
        .bind(fields.phone)
        .bind(fields.grade)
        .bind(fields.graduation_year)
        .bind(fields.nationality)
        .bind(fields.university)
        .bind(id)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn set_avatar(
        db: &SqlitePool,
        id: i64,
        bytes: &[u8],
        mime: &str,
    ) -> anyhow::Result<u64> {
        let result = sqlx::query("UPDATE users SET avatar = ?, avatar_mime = ? WHERE id = ?")
            .bind(bytes)
            .bind(mime)
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    /// Load the stored avatar bytes and their recorded MIME type.
    pub async fn fetch_avatar(
        db: &SqlitePool,
        id: i64,
    ) -> anyhow::Result<Option<(Vec<u8>, String)>> {
        let row: Option<(Option<Vec<u8>>, Option<String>)> =
            sqlx::query_as("SELECT avatar, avatar_mime FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(db)
                .await?;
        Ok(match row {
            Some((Some(bytes), mime)) => {
                Some((bytes, mime.unwrap_or_else(|| "image/jpeg".to_string())))
            }
            _ => None,
        })
    }
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation
    )
}
