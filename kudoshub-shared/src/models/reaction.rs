/// Reaction aggregate: per-(user, kudos, kind) membership and derived counts
///
/// A reaction is a membership record, not a counter: toggling flips the
/// existence of the (user, kudos, kind) triple. The unique constraint on that
/// triple is the final arbiter under concurrent requests; the toggle runs
/// inside one transaction and never relies on in-process locking, so it stays
/// correct across multiple server instances.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE reactions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     kudos_id UUID NOT NULL REFERENCES kudos(id) ON DELETE CASCADE,
///     reaction_type VARCHAR(10) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT uq_reaction_membership UNIQUE (user_id, kudos_id, reaction_type)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Error type for aggregate operations
#[derive(Debug, thiserror::Error)]
pub enum ReactionError {
    /// The kudos being reacted to does not exist
    #[error("Kudos not found")]
    KudosNotFound,

    /// The underlying store failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The fixed enumerated set of reaction kinds
///
/// Display order is the declaration order; `summarize` always returns all
/// four kinds in this order, zero counts included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReactionKind {
    #[serde(rename = "👍")]
    ThumbsUp,

    #[serde(rename = "❤️")]
    Heart,

    #[serde(rename = "🎉")]
    Tada,

    #[serde(rename = "🔥")]
    Fire,
}

impl ReactionKind {
    /// All kinds in display order
    pub const ALL: [ReactionKind; 4] = [
        ReactionKind::ThumbsUp,
        ReactionKind::Heart,
        ReactionKind::Tada,
        ReactionKind::Fire,
    ];

    /// The emoji stored in the `reaction_type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::ThumbsUp => "👍",
            ReactionKind::Heart => "❤️",
            ReactionKind::Tada => "🎉",
            ReactionKind::Fire => "🔥",
        }
    }

    /// Parses a stored or client-supplied emoji back into a kind
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a toggle call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// The membership was created by this call
    Added,

    /// The membership was removed by this call
    Removed,
}

impl Toggle {
    /// The boolean shape the mutation surface reports (`true` = added)
    pub fn was_added(&self) -> bool {
        matches!(self, Toggle::Added)
    }
}

/// One entry of a kudos's reaction summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionSummary {
    /// Which kind this entry describes
    #[serde(rename = "reactionType")]
    pub kind: ReactionKind,

    /// How many users hold this membership on the kudos
    pub count: i64,

    /// Whether the viewing actor holds it (false when anonymous)
    #[serde(rename = "userReacted")]
    pub actor_reacted: bool,
}

/// Folds raw per-kind counts and the actor's membership set into the fixed
/// display-order summary
///
/// Rows with a `reaction_type` outside the enumerated set are ignored; kinds
/// with no rows appear with a zero count.
pub fn assemble_summary(counts: &[(String, i64)], actor_kinds: &[String]) -> Vec<ReactionSummary> {
    ReactionKind::ALL
        .iter()
        .map(|kind| {
            let count = counts
                .iter()
                .find(|(s, _)| s == kind.as_str())
                .map(|(_, n)| *n)
                .unwrap_or(0);

            let actor_reacted = actor_kinds.iter().any(|s| s == kind.as_str());

            ReactionSummary {
                kind: *kind,
                count,
                actor_reacted,
            }
        })
        .collect()
}

/// Marker type carrying the aggregate's database operations
pub struct Reaction;

impl Reaction {
    /// Toggles the (actor, kudos, kind) membership atomically
    ///
    /// Runs in a single transaction: if the membership exists it is deleted
    /// and `Removed` is reported, otherwise it is inserted and `Added` is
    /// reported. When a concurrent request wins the insert race, the
    /// uniqueness constraint surfaces the conflict and this call observes the
    /// winner's row, removing it and reporting `Removed`; two simultaneous
    /// toggles never both report `Added`.
    ///
    /// # Errors
    ///
    /// `ReactionError::KudosNotFound` when the kudos is absent
    pub async fn toggle(
        pool: &PgPool,
        actor_id: Uuid,
        kudos_id: Uuid,
        kind: ReactionKind,
    ) -> Result<Toggle, ReactionError> {
        let mut tx = pool.begin().await?;

        let kudos_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM kudos WHERE id = $1)")
                .bind(kudos_id)
                .fetch_one(&mut *tx)
                .await?;

        if !kudos_exists {
            return Err(ReactionError::KudosNotFound);
        }

        let deleted = sqlx::query(
            r#"
            DELETE FROM reactions
            WHERE user_id = $1 AND kudos_id = $2 AND reaction_type = $3
            "#,
        )
        .bind(actor_id)
        .bind(kudos_id)
        .bind(kind.as_str())
        .execute(&mut *tx)
        .await?;

        if deleted.rows_affected() > 0 {
            tx.commit().await?;
            return Ok(Toggle::Removed);
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO reactions (user_id, kudos_id, reaction_type)
            VALUES ($1, $2, $3)
            ON CONFLICT ON CONSTRAINT uq_reaction_membership DO NOTHING
            "#,
        )
        .bind(actor_id)
        .bind(kudos_id)
        .bind(kind.as_str())
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            // A concurrent toggle committed the insert between our delete and
            // insert; observe its row and resolve this call as the removal.
            sqlx::query(
                r#"
                DELETE FROM reactions
                WHERE user_id = $1 AND kudos_id = $2 AND reaction_type = $3
                "#,
            )
            .bind(actor_id)
            .bind(kudos_id)
            .bind(kind.as_str())
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            return Ok(Toggle::Removed);
        }

        tx.commit().await?;
        Ok(Toggle::Added)
    }

    /// Summarizes reactions on a kudos relative to an optional actor
    ///
    /// Counts are a per-kind group-count; the actor's membership set is the
    /// kinds for which the actor has a row. Both are derived on read, never
    /// stored.
    pub async fn summarize(
        pool: &PgPool,
        kudos_id: Uuid,
        actor_id: Option<Uuid>,
    ) -> Result<Vec<ReactionSummary>, sqlx::Error> {
        let counts: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT reaction_type, COUNT(*)
            FROM reactions
            WHERE kudos_id = $1
            GROUP BY reaction_type
            "#,
        )
        .bind(kudos_id)
        .fetch_all(pool)
        .await?;

        let actor_kinds: Vec<String> = match actor_id {
            Some(actor_id) => {
                let rows: Vec<(String,)> = sqlx::query_as(
                    r#"
                    SELECT reaction_type
                    FROM reactions
                    WHERE kudos_id = $1 AND user_id = $2
                    "#,
                )
                .bind(kudos_id)
                .bind(actor_id)
                .fetch_all(pool)
                .await?;

                rows.into_iter().map(|(s,)| s).collect()
            }
            None => Vec::new(),
        };

        Ok(assemble_summary(&counts, &actor_kinds))
    }
}
