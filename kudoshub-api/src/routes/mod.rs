/// API route handlers
///
/// Routes are organized by surface:
/// - `health`: Liveness and database connectivity probe
/// - `auth`: Registration, login, current-user lookup
/// - `graph`: The single data endpoint for queries and mutations

pub mod auth;
pub mod graph;
pub mod health;
