//! PostgreSQL persistence for projects, sprints and guest links.
//!
//! Queries are plain runtime `sqlx::query_as` calls grouped into one
//! zero-sized repository per table. [`PgRepository`] stitches them together
//! behind the core [`Repository`](autochrone_core::repository::Repository) port.

use autochrone_core::error::CoreError;
use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod pg_repository;
pub mod repositories;

pub use pg_repository::PgRepository;

pub type DbPool = sqlx::PgPool;

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations under `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Translate a driver error into the core taxonomy.
///
/// Unique-key collisions become [`CoreError::Conflict`]; anything else is a
/// [`CoreError::Storage`] failure and is logged here.
pub fn map_sqlx_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return CoreError::Conflict(format!(
                "Duplicate value violates unique constraint: {constraint}"
            ));
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Storage(err.to_string())
}
