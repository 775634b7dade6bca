//! Shared type definitions for simbld_accounts
//!
//! Startup errors and the storage handle shared by the binary and the health endpoint.

use deadpool_postgres::Pool;
use std::sync::Arc;
use thiserror::Error;

use crate::store::memory::InMemoryStore;

/// Application startup errors
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Database connection error: {0}")]
    Database(String),
    #[error("Server binding error: {0}")]
    ServerBind(String),
}

impl From<config::ConfigError> for StartupError {
    fn from(error: config::ConfigError) -> Self {
        StartupError::Config(error.to_string())
    }
}

/// Handle on whichever storage backend the service was started with
#[derive(Clone)]
pub enum Storage {
    Postgres(Pool),
    Memory(Arc<InMemoryStore>),
}

impl Storage {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Storage::Postgres(_) => "postgres",
            Storage::Memory(_) => "memory",
        }
    }
}
