/// Single data endpoint
///
/// All queries and mutations share one POST endpoint. The request names an
/// operation and carries its input; dispatch is an explicit routing table
/// from operation name to a typed handler, so every operation's input and
/// output shapes are plain Rust structs.
///
/// # Endpoint
///
/// ```text
/// POST /graphql
/// Content-Type: application/json
///
/// { "operation": "sendKudos", "input": { "receiverId": "...", "message": "..." } }
/// ```
///
/// # Response
///
/// ```json
/// { "data": { "sendKudos": { ... } } }
/// ```
///
/// # Operations
///
/// | Operation        | Auth     | Input                          |
/// |------------------|----------|--------------------------------|
/// | `users`          | optional | `limit?`, `offset?`            |
/// | `kudos`          | optional | `limit?`, `offset?`            |
/// | `kudosReceived`  | optional | `userId`, `limit?`, `offset?`  |
/// | `sendKudos`      | required | `receiverId`, `message`        |
/// | `toggleReaction` | required | `kudosId`, `reactionType`      |
///
/// Reads resolve the actor optionally: an unusable credential degrades to an
/// anonymous view instead of failing. Mutations require an actor, and the
/// sender of a kudos is always the resolved actor regardless of input.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::auth::UserResponse,
};
use axum::{extract::State, http::HeaderMap, Json};
use chrono::{DateTime, Utc};
use kudoshub_shared::{
    auth::gate,
    models::{
        kudos::{Kudos, KudosWithParties, Party},
        reaction::{Reaction, ReactionKind, ReactionSummary},
        user::User,
    },
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Default page size when the caller does not pass a limit
const DEFAULT_LIMIT: i64 = 50;

/// Hard ceiling on page size
const MAX_LIMIT: i64 = 100;

/// Request envelope for the data endpoint
#[derive(Debug, Deserialize)]
pub struct GraphRequest {
    /// Operation name, e.g. "sendKudos"
    pub operation: String,

    /// Operation input; defaults to an empty object
    #[serde(default)]
    pub input: Value,
}

/// Input for listing operations
#[derive(Debug, Default, Deserialize)]
pub struct ListInput {
    /// Maximum number of rows to return
    pub limit: Option<i64>,

    /// Number of rows to skip
    pub offset: Option<i64>,
}

/// Input for the `kudosReceived` operation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KudosReceivedInput {
    /// User whose received kudos to list
    pub user_id: Uuid,

    /// Maximum number of rows to return
    pub limit: Option<i64>,

    /// Number of rows to skip
    pub offset: Option<i64>,
}

/// Input for the `sendKudos` operation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendKudosInput {
    /// Receiving user
    pub receiver_id: Uuid,

    /// Recognition message
    pub message: String,

    /// Accepted for wire compatibility but ignored; the sender is always the
    /// authenticated actor
    #[serde(default)]
    #[allow(dead_code)]
    pub sender_id: Option<Uuid>,
}

/// Input for the `toggleReaction` operation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleReactionInput {
    /// Kudos to react to
    pub kudos_id: Uuid,

    /// Reaction emoji, one of the enumerated kinds
    pub reaction_type: String,
}

/// A kudos with both parties and its reaction summary
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KudosPayload {
    /// Kudos ID
    pub id: Uuid,

    /// Recognition message
    pub message: String,

    /// When the kudos was sent
    pub created_at: DateTime<Utc>,

    /// Sending user
    pub sender: PartyPayload,

    /// Receiving user
    pub receiver: PartyPayload,

    /// Per-kind reaction summary in display order
    pub reactions: Vec<ReactionSummary>,
}

/// Public representation of a kudos party
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyPayload {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl From<Party> for PartyPayload {
    fn from(party: Party) -> Self {
        Self {
            id: party.id,
            email: party.email,
            name: party.name,
            avatar_url: party.avatar_url,
        }
    }
}

impl KudosPayload {
    fn assemble(kudos: KudosWithParties, reactions: Vec<ReactionSummary>) -> Self {
        Self {
            id: kudos.id,
            message: kudos.message,
            created_at: kudos.created_at,
            sender: kudos.sender.into(),
            receiver: kudos.receiver.into(),
            reactions,
        }
    }
}

/// Clamps a caller-supplied limit into `1..=MAX_LIMIT`
fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Clamps a caller-supplied offset to be non-negative
fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Deserializes an operation input, mapping failures to a 400
///
/// An absent or null input is treated as an empty object so operations with
/// all-optional inputs work without one.
fn parse_input<T: serde::de::DeserializeOwned>(operation: &str, input: Value) -> ApiResult<T> {
    let input = if input.is_null() { json!({}) } else { input };
    serde_json::from_value(input)
        .map_err(|e| ApiError::BadRequest(format!("Invalid input for {}: {}", operation, e)))
}

/// Dispatch handler for the data endpoint
///
/// # Errors
///
/// - `400 Bad Request`: Unknown operation or malformed input
/// - `401 Unauthorized`: Mutation without a usable credential
/// - `403 Forbidden`: Mutation from a deactivated account
/// - `404 Not Found`: Referenced kudos or receiver does not exist
/// - `422 Unprocessable Entity`: Input failed validation
pub async fn execute(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<GraphRequest>,
) -> ApiResult<Json<Value>> {
    let data = match req.operation.as_str() {
        "users" => {
            let input: ListInput = parse_input(&req.operation, req.input)?;
            let users = User::list(
                &state.db,
                clamp_limit(input.limit),
                clamp_offset(input.offset),
            )
            .await?;
            let payload: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
            serde_json::to_value(payload)
        }
        "kudos" => {
            let input: ListInput = parse_input(&req.operation, req.input)?;
            let viewer = gate::optional_actor(&state.db, state.jwt_secret(), &headers).await;
            let rows = Kudos::list_feed(
                &state.db,
                clamp_limit(input.limit),
                clamp_offset(input.offset),
            )
            .await?;
            let payload = annotate(&state, rows, viewer.map(|a| a.id)).await?;
            serde_json::to_value(payload)
        }
        "kudosReceived" => {
            let input: KudosReceivedInput = parse_input(&req.operation, req.input)?;
            let viewer = gate::optional_actor(&state.db, state.jwt_secret(), &headers).await;
            let rows = Kudos::list_received(
                &state.db,
                input.user_id,
                clamp_limit(input.limit),
                clamp_offset(input.offset),
            )
            .await?;
            let payload = annotate(&state, rows, viewer.map(|a| a.id)).await?;
            serde_json::to_value(payload)
        }
        "sendKudos" => {
            let actor = gate::require_actor(&state.db, state.jwt_secret(), &headers).await?;
            let input: SendKudosInput = parse_input(&req.operation, req.input)?;
            let kudos =
                Kudos::create(&state.db, actor.id, input.receiver_id, &input.message).await?;

            tracing::info!(kudos_id = %kudos.id, sender_id = %actor.id, "Sent kudos");

            // A fresh kudos has no reactions yet; the summary is all zeroes
            let reactions = Reaction::summarize(&state.db, kudos.id, Some(actor.id)).await?;
            serde_json::to_value(KudosPayload::assemble(kudos, reactions))
        }
        "toggleReaction" => {
            let actor = gate::require_actor(&state.db, state.jwt_secret(), &headers).await?;
            let input: ToggleReactionInput = parse_input(&req.operation, req.input)?;

            let kind = ReactionKind::parse(&input.reaction_type).ok_or_else(|| {
                ApiError::invalid_field(
                    "reactionType",
                    format!("Unknown reaction type: {}", input.reaction_type),
                )
            })?;

            let toggle = Reaction::toggle(&state.db, actor.id, input.kudos_id, kind).await?;
            serde_json::to_value(toggle.was_added())
        }
        other => {
            return Err(ApiError::BadRequest(format!("Unknown operation: {}", other)));
        }
    }
    .map_err(|e| ApiError::InternalError(format!("Response serialization failed: {}", e)))?;

    let mut envelope = serde_json::Map::new();
    envelope.insert(req.operation, data);

    Ok(Json(json!({ "data": envelope })))
}

/// Attaches a reaction summary to each kudos in a listing
async fn annotate(
    state: &AppState,
    rows: Vec<KudosWithParties>,
    viewer_id: Option<Uuid>,
) -> ApiResult<Vec<KudosPayload>> {
    let mut payload = Vec::with_capacity(rows.len());
    for kudos in rows {
        let reactions = Reaction::summarize(&state.db, kudos.id, viewer_id).await?;
        payload.push(KudosPayload::assemble(kudos, reactions));
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit_default() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
    }

    #[test]
    fn test_clamp_limit_bounds() {
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-5)), 1);
        assert_eq!(clamp_limit(Some(10)), 10);
        assert_eq!(clamp_limit(Some(10_000)), MAX_LIMIT);
    }

    #[test]
    fn test_clamp_offset_bounds() {
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(-3)), 0);
        assert_eq!(clamp_offset(Some(25)), 25);
    }

    #[test]
    fn test_graph_request_defaults_input() {
        let req: GraphRequest = serde_json::from_str(r#"{"operation": "users"}"#)
            .expect("envelope without input should parse");
        assert_eq!(req.operation, "users");
        assert!(req.input.is_null());

        // A null input deserializes into an all-default ListInput
        let input: ListInput = parse_input("users", req.input).expect("null input");
        assert!(input.limit.is_none());
    }

    #[test]
    fn test_send_kudos_input_ignores_sender() {
        let input: SendKudosInput = serde_json::from_value(json!({
            "receiverId": "7f1b2a4c-9a9b-4a87-bc7d-0f1e2d3c4b5a",
            "message": "Great work!",
            "senderId": "00000000-0000-0000-0000-000000000001"
        }))
        .expect("input should parse");

        assert_eq!(input.message, "Great work!");
    }

    #[test]
    fn test_toggle_input_requires_both_fields() {
        let result: Result<ToggleReactionInput, _> = serde_json::from_value(json!({
            "kudosId": "7f1b2a4c-9a9b-4a87-bc7d-0f1e2d3c4b5a"
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_parse_input_rejects_malformed() {
        let result: ApiResult<ToggleReactionInput> =
            parse_input("toggleReaction", json!({ "kudosId": "not-a-uuid" }));

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
