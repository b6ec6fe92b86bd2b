/// Authorization gate: resolves the current actor from request metadata
///
/// Every operation that cares about identity goes through one of two
/// resolution modes, both built on `resolve_token`:
///
/// - **Required**: missing/malformed credential, unresolvable or expired
///   token, unknown user, or inactive user each fail the request. Used by all
///   mutations and the "me" read.
/// - **Optional**: the same pipeline, but any failure degrades to "no actor".
///   Used by listing reads where reaction personalization is a nice-to-have.
///
/// The gate never causes a side effect: it maps request metadata (plus a user
/// lookup) to an [`Actor`] or an error.
///
/// # Example
///
/// ```no_run
/// use axum::http::HeaderMap;
/// use kudoshub_shared::auth::gate::{optional_actor, require_actor};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, headers: HeaderMap) -> anyhow::Result<()> {
/// // Mutation path: fail without a valid credential
/// let actor = require_actor(&pool, "secret", &headers).await?;
/// println!("acting as {}", actor.email);
///
/// // Listing path: degrade to anonymous
/// let viewer = optional_actor(&pool, "secret", &headers).await;
/// assert!(viewer.is_none() || viewer.is_some());
/// # Ok(())
/// # }
/// ```

use axum::http::{header, HeaderMap};
use sqlx::PgPool;
use uuid::Uuid;

use super::token::{resolve_token, TokenError};
use crate::models::user::User;

/// The identity resolved from a request's bearer credential
///
/// A snapshot of the user row at resolution time; holders of an `Actor` can
/// assume the account existed and was active when the request was admitted.
#[derive(Debug, Clone)]
pub struct Actor {
    /// User id the token was issued for
    pub id: Uuid,

    /// Email of the resolved user
    pub email: String,

    /// Display name of the resolved user
    pub name: String,

    /// Avatar of the resolved user, if set
    pub avatar_url: Option<String>,

    /// Active flag as observed at resolution time
    ///
    /// Always true for actors admitted by the gate; carried so responses
    /// echo the row rather than assuming the admission policy.
    pub is_active: bool,
}

impl Actor {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
            is_active: user.is_active,
        }
    }
}

/// Error type for required actor resolution
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// No usable credential, or the credential did not resolve to a user
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// The credential resolved to an account that has been deactivated
    #[error("Inactive user")]
    Inactive,

    /// The user lookup failed for infrastructural reasons
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Extracts the bearer token from the `Authorization` header
///
/// A missing header, a non-UTF-8 value, or a non-Bearer scheme all count as
/// "no credential" rather than an error.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use kudoshub_shared::auth::gate::bearer_token;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
/// assert_eq!(bearer_token(&headers), Some("abc"));
///
/// headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
/// assert_eq!(bearer_token(&headers), None);
/// ```
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Required resolution: the request fails without a valid, active actor
///
/// # Errors
///
/// - `GateError::Unauthenticated` for a missing credential, an invalid or
///   expired token, or a token whose subject no longer exists
/// - `GateError::Inactive` when the account has been deactivated
/// - `GateError::Database` when the user lookup itself fails
pub async fn require_actor(
    pool: &PgPool,
    secret: &str,
    headers: &HeaderMap,
) -> Result<Actor, GateError> {
    let token = bearer_token(headers)
        .ok_or_else(|| GateError::Unauthenticated("Missing bearer credential".to_string()))?;

    let user_id = resolve_token(token, secret).map_err(|e| match e {
        TokenError::Expired => GateError::Unauthenticated("Token expired".to_string()),
        _ => GateError::Unauthenticated("Invalid token".to_string()),
    })?;

    let user = User::find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| GateError::Unauthenticated("User not found".to_string()))?;

    if !user.is_active {
        return Err(GateError::Inactive);
    }

    Ok(Actor::from_user(&user))
}

/// Optional resolution: any failure yields "no actor"
///
/// Infrastructure errors are logged but still degrade to `None`; read paths
/// answer anonymously rather than failing on personalization.
pub async fn optional_actor(pool: &PgPool, secret: &str, headers: &HeaderMap) -> Option<Actor> {
    let token = bearer_token(headers)?;
    let user_id = resolve_token(token, secret).ok()?;

    let user = match User::find_by_id(pool, user_id).await {
        Ok(found) => found?,
        Err(e) => {
            tracing::warn!("Actor lookup failed during optional resolution: {}", e);
            return None;
        }
    };

    if !user.is_active {
        return None;
    }

    Some(Actor::from_user(&user))
}
