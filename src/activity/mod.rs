//! Activity module
//!
//! Append-only audit trail of profile-mutating actions. Records are written by the user
//! service and only ever removed in bulk when their owner deletes the account.

pub mod models;
pub mod repository;

pub use models::{Activity, ActivityCategory};
pub use repository::{ActivityRepository, PgActivityRepository};
