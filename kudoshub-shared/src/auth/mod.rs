/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and the account password policy
/// - [`token`]: Bearer token issuing and resolution (HS256, fixed TTL)
/// - [`gate`]: Required/optional actor resolution from request metadata
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Bearer Tokens**: HS256 signing with configurable expiration
/// - **Constant-time Comparison**: Password verification is constant-time
///
/// # Example
///
/// ```
/// use kudoshub_shared::auth::password::{hash_password, verify_password};
/// use kudoshub_shared::auth::token::{issue_token, resolve_token};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let digest = hash_password("pass1234")?;
/// assert!(verify_password("pass1234", &digest)?);
///
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let token = issue_token(Uuid::new_v4(), Duration::hours(1), secret)?;
/// resolve_token(&token, secret)?;
/// # Ok(())
/// # }
/// ```

pub mod gate;
pub mod password;
pub mod token;
