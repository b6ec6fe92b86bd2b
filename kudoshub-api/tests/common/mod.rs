/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test user creation
/// - Bearer token generation
/// - API client helpers
///
/// Tests that talk to the database need `DATABASE_URL` and `JWT_SECRET` set
/// and are marked `#[ignore]`; the lazy context lets the rest run against a
/// router whose pool never connects.

use kudoshub_api::app::{build_router, AppState};
use kudoshub_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use kudoshub_shared::auth::password::hash_password;
use kudoshub_shared::auth::token::issue_token;
use kudoshub_shared::db::migrations::run_migrations;
use kudoshub_shared::models::user::{CreateUser, User};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

/// Password used for every test account
pub const TEST_PASSWORD: &str = "correct horse 1";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub token: String,
}

impl TestContext {
    /// Creates a test context backed by a real database
    ///
    /// Connects with `DATABASE_URL`, applies migrations, and registers a
    /// fresh user with a unique email.
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;
        run_migrations(&db).await?;

        let user = User::create(
            &db,
            CreateUser {
                email: format!("test-{}@example.com", Uuid::new_v4()),
                name: "Test User".to_string(),
                password_hash: hash_password(TEST_PASSWORD)?,
                avatar_url: None,
            },
        )
        .await?;

        let token = issue_token(user.id, config.token_ttl(), &config.jwt.secret)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            token,
        })
    }

    /// Returns the authorization header value for the test user
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Cleans up test data (cascades to kudos and reactions)
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        User::delete(&self.db, self.user.id).await?;
        Ok(())
    }
}

/// Builds a router over a pool that never connects
///
/// Useful for exercising paths that must fail before any database work:
/// missing credentials, unknown operations, and request validation.
pub fn lazy_router() -> anyhow::Result<axum::Router> {
    let config = Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "postgresql://localhost:1/unreachable".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: "integration-test-secret-0123456789abcdef".to_string(),
            ttl_hours: 1,
        },
    };

    let db = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&config.database.url)?;

    Ok(build_router(AppState::new(db, config)))
}
