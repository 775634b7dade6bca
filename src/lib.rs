//! Simbld Accounts Service
//!
//! User account management built with Actix-web and `PostgreSQL`: admin CRUD over users,
//! self-service profile updates with avatar uploads, account deletion that cascades to
//! owned records, and an activity log.

pub mod activity;
pub mod auth;
pub mod config;
pub mod health;
pub mod postgres;
pub mod records;
pub mod state;
pub mod store;
pub mod types;
pub mod upload;
pub mod user;
pub mod utils;

// Re-export commonly used types and functions
pub use state::AppState;
pub use user::routes::configure_user_routes;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SERVICE_NAME: &str = "simbld-accounts";
