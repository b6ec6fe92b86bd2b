/// Bearer token issuing and resolution
///
/// Access tokens are JWTs signed with HS256 (HMAC-SHA256). Each token carries
/// the user id as its subject and an expiry derived from the configured TTL.
/// There is no refresh-token flow: a token is valid until it expires, after
/// which the client logs in again.
///
/// # Example
///
/// ```
/// use kudoshub_shared::auth::token::{issue_token, resolve_token};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let secret = "test-secret-key-at-least-32-bytes-long";
///
/// let token = issue_token(user_id, Duration::hours(1), secret)?;
/// assert_eq!(resolve_token(&token, secret)?, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped into every token
const ISSUER: &str = "kudoshub";

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token is invalid (bad signature, issuer, or format)
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// JWT claims structure
///
/// - `sub`: Subject (user id)
/// - `iss`: Issuer (always "kudoshub")
/// - `iat`: Issued at (Unix timestamp)
/// - `exp`: Expiration (Unix timestamp)
/// - `nbf`: Not before (Unix timestamp)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
}

impl Claims {
    /// Creates claims for a user with the given time-to-live
    pub fn new(user_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + ttl;

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Issues a signed bearer token for a user
///
/// # Errors
///
/// Returns `TokenError::CreateError` if encoding fails
pub fn issue_token(user_id: Uuid, ttl: Duration, secret: &str) -> Result<String, TokenError> {
    let claims = Claims::new(user_id, ttl);
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, &claims, &key)
        .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Resolves a bearer token to the user id it was issued for
///
/// Verifies signature, expiry, not-before, and issuer.
///
/// # Errors
///
/// - `TokenError::Expired` if the token's expiry has passed
/// - `TokenError::Invalid` for any other validation failure
pub fn resolve_token(token: &str, secret: &str) -> Result<Uuid, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, Duration::hours(1));

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "kudoshub");
        assert!(!claims.is_expired());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_issue_and_resolve_token() {
        let user_id = Uuid::new_v4();

        let token = issue_token(user_id, Duration::hours(1), SECRET).expect("Should issue token");
        let resolved = resolve_token(&token, SECRET).expect("Should resolve token");

        assert_eq!(resolved, user_id);
    }

    #[test]
    fn test_resolve_with_wrong_secret() {
        let token =
            issue_token(Uuid::new_v4(), Duration::hours(1), SECRET).expect("Should issue token");

        let result = resolve_token(&token, "a-completely-different-secret-key");
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_resolve_expired_token() {
        let user_id = Uuid::new_v4();

        // Negative TTL = already expired
        let claims = Claims::new(user_id, Duration::seconds(-3600));
        assert!(claims.is_expired());

        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(SECRET.as_bytes());
        let token = encode(&header, &claims, &key).expect("Should encode");

        let result = resolve_token(&token, SECRET);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_resolve_garbage_token() {
        let result = resolve_token("not.a.jwt", SECRET);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_resolve_rejects_foreign_issuer() {
        #[derive(Serialize)]
        struct ForeignClaims {
            sub: Uuid,
            iss: String,
            iat: i64,
            exp: i64,
            nbf: i64,
        }

        let now = Utc::now().timestamp();
        let claims = ForeignClaims {
            sub: Uuid::new_v4(),
            iss: "someone-else".to_string(),
            iat: now,
            exp: now + 3600,
            nbf: now,
        };

        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(SECRET.as_bytes());
        let token = encode(&header, &claims, &key).expect("Should encode");

        let result = resolve_token(&token, SECRET);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }
}
