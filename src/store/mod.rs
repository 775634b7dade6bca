//! Repository wiring
//!
//! Bundles the four collection repositories the user service needs, built either over a
//! Postgres pool or over a shared [`InMemoryStore`].

pub mod memory;

use deadpool_postgres::Pool;
use std::sync::Arc;

use crate::activity::repository::{ActivityRepository, PgActivityRepository};
use crate::records::{OwnedRecordRepository, PgOwnedRecordRepository, RecordCollection};
use crate::user::repository::{PgUserRepository, UserRepository};
use memory::InMemoryStore;

#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub activities: Arc<dyn ActivityRepository>,
    pub issues: Arc<dyn OwnedRecordRepository>,
    pub comments: Arc<dyn OwnedRecordRepository>,
}

impl Repositories {
    pub fn postgres(pool: Pool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            activities: Arc::new(PgActivityRepository::new(pool.clone())),
            issues: Arc::new(PgOwnedRecordRepository::new(pool.clone(), RecordCollection::Issues)),
            comments: Arc::new(PgOwnedRecordRepository::new(pool, RecordCollection::Comments)),
        }
    }

    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            activities: store.clone(),
            issues: Arc::new(store.records(RecordCollection::Issues)),
            comments: Arc::new(store.records(RecordCollection::Comments)),
        }
    }
}
