//! PostgreSQL storage backend

pub mod config;
pub mod schema;

pub use config::{create_pool, health_check};
pub use schema::ensure_schema;
