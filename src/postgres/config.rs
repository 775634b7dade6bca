//! PostgreSQL connection pool configuration and setup
//!
//! This module handles the creation and configuration of a connection pool
//! for PostgreSQL database access.

use deadpool_postgres::{Config, Pool, PoolConfig, Runtime};
use std::time::Duration;
use tokio_postgres::NoTls;

use crate::config::DatabaseConfig;
use crate::types::StartupError;

/// Creates a PostgreSQL connection pool from the database settings
///
/// The pool connects lazily; call [`health_check`] to fail fast on bad credentials.
pub fn create_pool(settings: &DatabaseConfig) -> Result<Pool, StartupError> {
    let mut cfg = Config::new();

    cfg.host = Some(settings.host.clone());
    cfg.port = Some(settings.port);
    cfg.user = Some(settings.user.clone());
    cfg.password = Some(settings.password.clone());
    cfg.dbname = Some(settings.dbname.clone());

    cfg.pool = Some(PoolConfig::new(settings.max_connections));
    cfg.connect_timeout = Some(Duration::from_secs(settings.connect_timeout_secs));

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(|e| StartupError::Database(format!("Failed to create connection pool: {e}")))
}

/// Checks if the database connection is working
pub async fn health_check(pool: &Pool) -> Result<(), String> {
    let client =
        pool.get().await.map_err(|e| format!("Failed to get database connection: {}", e))?;

    client
        .query_one("SELECT 1", &[])
        .await
        .map_err(|e| format!("Database health check failed: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool_is_lazy() {
        // No server is contacted until the first checkout.
        let pool = create_pool(&DatabaseConfig::default());
        assert!(pool.is_ok());
    }
}
