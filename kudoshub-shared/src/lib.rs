//! # KudosHub Shared Library
//!
//! Shared types and business logic used by the KudosHub API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models: user directory, kudos ledger, reaction aggregate
//! - `auth`: Password hashing, bearer tokens, and the authorization gate
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the KudosHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
