/// User directory model and database operations
///
/// Users are the endpoints of every kudos: senders, receivers, and reactors
/// all reference rows in this table. Email uniqueness is enforced at the
/// directory level by the unique constraint; an inactive user can still be
/// looked up but is rejected from protected operations by the gate.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     name VARCHAR(255) NOT NULL,
///     avatar_url VARCHAR(512),
///     password_hash VARCHAR(255) NOT NULL,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use kudoshub_shared::models::user::{CreateUser, User};
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(
///     &pool,
///     CreateUser {
///         email: "alice@example.com".to_string(),
///         name: "Alice".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         avatar_url: None,
///     },
/// )
/// .await?;
///
/// let found = User::find_by_email(&pool, "alice@example.com").await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User model representing an account in the directory
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user id (UUID v4)
    pub id: Uuid,

    /// Email address, unique across all users (case-sensitive as stored)
    pub email: String,

    /// Display name
    pub name: String,

    /// Optional avatar/profile picture URL
    pub avatar_url: Option<String>,

    /// Argon2id password digest, never plaintext
    pub password_hash: String,

    /// Whether the account may use protected operations
    pub is_active: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated (None if never updated)
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address
    pub email: String,

    /// Display name (already validated, see [`sanitize_display_name`])
    pub name: String,

    /// Argon2id password digest (NOT a plaintext password)
    pub password_hash: String,

    /// Optional avatar URL
    pub avatar_url: Option<String>,
}

/// Strips markup-like substrings from a display name and trims whitespace
///
/// Anything between `<` and `>` is removed, so `"<b>Alice</b>"` becomes
/// `"Alice"`. Returns `None` when nothing readable remains.
///
/// # Example
///
/// ```
/// use kudoshub_shared::models::user::sanitize_display_name;
///
/// assert_eq!(sanitize_display_name("Alice"), Some("Alice".to_string()));
/// assert_eq!(sanitize_display_name("<b>Alice</b>"), Some("Alice".to_string()));
/// assert_eq!(sanitize_display_name("<script></script>"), None);
/// assert_eq!(sanitize_display_name("   "), None);
/// ```
pub fn sanitize_display_name(raw: &str) -> Option<String> {
    let mut cleaned = String::with_capacity(raw.len());
    let mut depth = 0usize;

    for c in raw.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => cleaned.push(c),
            _ => {}
        }
    }

    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl User {
    /// Creates a new user in the directory
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint
    /// violation) or the database is unreachable
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, password_hash, avatar_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, avatar_url, password_hash, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(data.email)
        .bind(data.name)
        .bind(data.password_hash)
        .bind(data.avatar_url)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by id, returning `None` when absent
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, avatar_url, password_hash, is_active,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address, returning `None` when absent
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, avatar_url, password_hash, is_active,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists users, newest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, avatar_url, password_hash, is_active,
                   created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Flips the active flag on an account
    ///
    /// Deactivated accounts can still be looked up (so their kudos keep
    /// rendering) but fail required actor resolution.
    ///
    /// # Returns
    ///
    /// True if the user was found and updated
    pub async fn set_active(pool: &PgPool, id: Uuid, active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(active)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user by id
    ///
    /// Kudos sent or received by the user, and reactions on those kudos,
    /// are removed by the storage layer's cascade rules.
    ///
    /// # Returns
    ///
    /// True if the user was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts directory rows holding an email
    ///
    /// The unique constraint keeps this at 0 or 1; anything else means the
    /// directory invariant broke.
    pub async fn count_by_email(pool: &PgPool, email: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_struct() {
        let create_user = CreateUser {
            email: "test@example.com".to_string(),
            name: "Test User".to_string(),
            password_hash: "hash".to_string(),
            avatar_url: None,
        };

        assert_eq!(create_user.email, "test@example.com");
        assert_eq!(create_user.name, "Test User");
    }

    #[test]
    fn test_sanitize_plain_name() {
        assert_eq!(sanitize_display_name("Alice"), Some("Alice".to_string()));
        assert_eq!(
            sanitize_display_name("  Bob Jones "),
            Some("Bob Jones".to_string())
        );
    }

    #[test]
    fn test_sanitize_strips_markup() {
        assert_eq!(
            sanitize_display_name("<b>Alice</b>"),
            Some("Alice".to_string())
        );
        assert_eq!(
            sanitize_display_name("Eve <img src=x onerror=alert(1)>"),
            Some("Eve".to_string())
        );
    }

    #[test]
    fn test_sanitize_rejects_empty() {
        assert_eq!(sanitize_display_name(""), None);
        assert_eq!(sanitize_display_name("   "), None);
        assert_eq!(sanitize_display_name("<script></script>"), None);
        assert_eq!(sanitize_display_name("<a><b>"), None);
    }

    #[test]
    fn test_sanitize_unbalanced_brackets() {
        // Unclosed tag swallows the rest of the string
        assert_eq!(sanitize_display_name("Alice <b"), Some("Alice".to_string()));
        // Stray closing bracket is dropped, text survives
        assert_eq!(sanitize_display_name("Al>ice"), Some("Alice".to_string()));
    }

    // Database operations are covered by the API integration tests.
}
