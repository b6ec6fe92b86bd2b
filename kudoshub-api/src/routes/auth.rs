/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration
/// - Login
/// - Current-user lookup
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register new user
/// - `POST /api/auth/login` - Login and get a bearer token
/// - `GET /api/auth/me` - Resolve the current user from the bearer credential

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::HeaderMap, Json};
use kudoshub_shared::{
    auth::{gate, password, token},
    models::user::{sanitize_display_name, CreateUser, User},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Display name (markup is stripped before storage)
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,

    /// Password (validated for strength separately)
    pub password: String,

    /// Optional avatar URL
    #[serde(rename = "avatarUrl")]
    pub avatar_url: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token
    #[serde(rename = "accessToken")]
    pub access_token: String,

    /// Token scheme, always "bearer"
    #[serde(rename = "tokenType")]
    pub token_type: String,
}

/// Public user representation
///
/// Never includes the password hash.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User ID
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Display name
    pub name: String,

    /// Avatar URL, if set
    pub avatar_url: Option<String>,

    /// Whether the account is active
    pub is_active: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            avatar_url: user.avatar_url,
            is_active: user.is_active,
        }
    }
}

fn collect_validation_errors(e: validator::ValidationErrors) -> ApiError {
    let errors: Vec<ValidationErrorDetail> = e
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    ApiError::ValidationError(errors)
}

/// Register a new user
///
/// The display name is sanitized before storage: angle-bracket markup is
/// stripped and a name that is empty afterwards is rejected.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "name": "Ada Lovelace",
///   "password": "correct horse 1"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed (email format, name,
///   password policy)
/// - `409 Conflict`: Email already registered
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<UserResponse>> {
    // Validate request
    req.validate().map_err(collect_validation_errors)?;

    let name = sanitize_display_name(&req.name)
        .ok_or_else(|| ApiError::invalid_field("name", "Name must not be empty"))?;

    password::validate_password_policy(&req.password)
        .map_err(|e| ApiError::invalid_field("password", e))?;

    // Hash password
    let password_hash = password::hash_password(&req.password)?;

    // Duplicate email surfaces as a unique violation and maps to 409
    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            name,
            password_hash,
            avatar_url: req.avatar_url,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "Registered new user");

    Ok(Json(UserResponse::from(user)))
}

/// Login endpoint
///
/// Authenticates a user and returns a bearer token.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "correct horse 1"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "accessToken": "eyJ...",
///   "tokenType": "bearer"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `401 Unauthorized`: Unknown email or wrong password (same message for
///   both)
/// - `403 Forbidden`: Account deactivated
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    // Validate request
    req.validate().map_err(collect_validation_errors)?;

    // Find user by email
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Incorrect email or password".to_string()))?;

    // Verify password
    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Incorrect email or password".to_string(),
        ));
    }

    if !user.is_active {
        return Err(ApiError::Forbidden("Inactive user".to_string()));
    }

    let access_token = token::issue_token(user.id, state.token_ttl(), state.jwt_secret())?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Current-user endpoint
///
/// Resolves the bearer credential to the account it was issued for.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing, invalid, or expired credential, or the
///   account no longer exists (response carries a `WWW-Authenticate: Bearer`
///   challenge)
/// - `403 Forbidden`: Account deactivated
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<UserResponse>> {
    let actor = gate::require_actor(&state.db, state.jwt_secret(), &headers).await?;

    Ok(Json(UserResponse {
        id: actor.id,
        email: actor.email,
        name: actor.name,
        avatar_url: actor.avatar_url,
        is_active: actor.is_active,
    }))
}
