/// Kudos ledger model and database operations
///
/// Kudos are append-only: a row is written once at send time and never
/// updated. The only way a kudos disappears is the cascade when either party
/// is deleted from the user directory. Read paths always join sender and
/// receiver identity eagerly so no per-row lookups are needed.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE kudos (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     sender_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     receiver_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     message TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Upper bound on kudos message length, in characters
pub const MESSAGE_MAX_LEN: usize = 1000;

/// Error type for ledger operations
#[derive(Debug, thiserror::Error)]
pub enum KudosError {
    /// The receiver id does not exist in the user directory
    #[error("Receiver not found")]
    ReceiverNotFound,

    /// The message failed validation
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// The underlying store failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A kudos row as stored
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Kudos {
    /// Unique kudos id (UUID v4)
    pub id: Uuid,

    /// Sender (always the resolved actor at creation)
    pub sender_id: Uuid,

    /// Receiver
    pub receiver_id: Uuid,

    /// Message text, non-empty, at most [`MESSAGE_MAX_LEN`] characters
    pub message: String,

    /// When the kudos was sent
    pub created_at: DateTime<Utc>,

    /// Unused for kudos (rows are immutable) but part of the common shape
    pub updated_at: Option<DateTime<Utc>>,
}

/// Sender/receiver identity embedded in ledger reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// A kudos joined with both parties' identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KudosWithParties {
    pub id: Uuid,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub sender: Party,
    pub receiver: Party,
}

/// Flat row shape for the two-way join; folded into [`KudosWithParties`]
#[derive(Debug, sqlx::FromRow)]
struct JoinedRow {
    id: Uuid,
    message: String,
    created_at: DateTime<Utc>,
    sender_id: Uuid,
    sender_email: String,
    sender_name: String,
    sender_avatar_url: Option<String>,
    receiver_id: Uuid,
    receiver_email: String,
    receiver_name: String,
    receiver_avatar_url: Option<String>,
}

impl From<JoinedRow> for KudosWithParties {
    fn from(row: JoinedRow) -> Self {
        Self {
            id: row.id,
            message: row.message,
            created_at: row.created_at,
            sender: Party {
                id: row.sender_id,
                email: row.sender_email,
                name: row.sender_name,
                avatar_url: row.sender_avatar_url,
            },
            receiver: Party {
                id: row.receiver_id,
                email: row.receiver_email,
                name: row.receiver_name,
                avatar_url: row.receiver_avatar_url,
            },
        }
    }
}

/// Select list shared by every joined read
const JOINED_COLUMNS: &str = r#"
    k.id, k.message, k.created_at,
    s.id AS sender_id, s.email AS sender_email,
    s.name AS sender_name, s.avatar_url AS sender_avatar_url,
    r.id AS receiver_id, r.email AS receiver_email,
    r.name AS receiver_name, r.avatar_url AS receiver_avatar_url
"#;

/// Validates a kudos message
///
/// Must be non-empty after trimming and within [`MESSAGE_MAX_LEN`] characters.
pub fn validate_message(message: &str) -> Result<(), String> {
    if message.trim().is_empty() {
        return Err("Message must not be empty".to_string());
    }

    if message.chars().count() > MESSAGE_MAX_LEN {
        return Err(format!(
            "Message must be at most {} characters",
            MESSAGE_MAX_LEN
        ));
    }

    Ok(())
}

impl Kudos {
    /// Appends a kudos to the ledger
    ///
    /// The caller passes the resolved actor as `sender_id`; client-supplied
    /// sender fields never reach this function.
    ///
    /// # Errors
    ///
    /// - `KudosError::InvalidMessage` when the message fails validation
    /// - `KudosError::ReceiverNotFound` when the receiver is absent
    pub async fn create(
        pool: &PgPool,
        sender_id: Uuid,
        receiver_id: Uuid,
        message: &str,
    ) -> Result<KudosWithParties, KudosError> {
        validate_message(message).map_err(KudosError::InvalidMessage)?;

        let receiver_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(receiver_id)
                .fetch_one(pool)
                .await?;

        if !receiver_exists {
            return Err(KudosError::ReceiverNotFound);
        }

        let (kudos_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO kudos (sender_id, receiver_id, message)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(message)
        .fetch_one(pool)
        .await?;

        let created = Self::find_with_parties(pool, kudos_id)
            .await?
            // The row was just inserted; losing it here means the store broke
            .ok_or(sqlx::Error::RowNotFound)?;

        Ok(created)
    }

    /// Fetches a single kudos joined with both parties
    pub async fn find_with_parties(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<KudosWithParties>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM kudos k
            JOIN users s ON s.id = k.sender_id
            JOIN users r ON r.id = k.receiver_id
            WHERE k.id = $1
            "#
        );

        let row = sqlx::query_as::<_, JoinedRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Lists the kudos feed, newest first, with parties eagerly joined
    pub async fn list_feed(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<KudosWithParties>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM kudos k
            JOIN users s ON s.id = k.sender_id
            JOIN users r ON r.id = k.receiver_id
            ORDER BY k.created_at DESC
            LIMIT $1 OFFSET $2
            "#
        );

        let rows = sqlx::query_as::<_, JoinedRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Lists kudos received by a user, newest first
    pub async fn list_received(
        pool: &PgPool,
        receiver_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<KudosWithParties>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM kudos k
            JOIN users s ON s.id = k.sender_id
            JOIN users r ON r.id = k.receiver_id
            WHERE k.receiver_id = $1
            ORDER BY k.created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );

        let rows = sqlx::query_as::<_, JoinedRow>(&query)
            .bind(receiver_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_message_accepts_normal_text() {
        assert!(validate_message("Great job!").is_ok());
        assert!(validate_message("a").is_ok());
    }

    #[test]
    fn test_validate_message_rejects_empty() {
        assert!(validate_message("").is_err());
        assert!(validate_message("   ").is_err());
        assert!(validate_message("\n\t").is_err());
    }

    #[test]
    fn test_validate_message_length_bound() {
        let at_limit = "x".repeat(MESSAGE_MAX_LEN);
        assert!(validate_message(&at_limit).is_ok());

        let over_limit = "x".repeat(MESSAGE_MAX_LEN + 1);
        let result = validate_message(&over_limit);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("at most"));
    }

    #[test]
    fn test_validate_message_counts_chars_not_bytes() {
        // Multibyte characters still count as one
        let emoji = "🎉".repeat(MESSAGE_MAX_LEN);
        assert!(validate_message(&emoji).is_ok());
    }

    // Ledger writes and joined reads are covered by the API integration tests.
}
