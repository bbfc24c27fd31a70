//! `PostgreSQL` adapters for task workflow persistence.

mod conversion;
mod models;
mod repository;
mod schema;

pub use repository::{PostgresTaskRepository, TaskPgPool};

use crate::config::TrackerConfig;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};

/// Builds a connection pool from configuration.
///
/// # Errors
///
/// Returns [`PoolError`] when the pool cannot establish its initial
/// connections within the configured timeout.
pub fn build_pool(config: &TrackerConfig) -> Result<TaskPgPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(config.database_url.as_str());
    Pool::builder()
        .max_size(config.pool_max_size)
        .connection_timeout(config.connect_timeout())
        .build(manager)
}
