/// Database utilities
///
/// - `pool`: PostgreSQL connection pool management
/// - `migrations`: Embedded sqlx migration runner

pub mod migrations;
pub mod pool;
