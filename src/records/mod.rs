//! Issues and comments
//!
//! Both collections belong to other services. This one only needs to purge them by
//! owner when an account is deleted, so they share a single repository trait.

use async_trait::async_trait;
use deadpool_postgres::Pool;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::error::UserError;
use crate::user::models::OwnerRef;

/// Collections whose documents embed an owner reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordCollection {
    Issues,
    Comments,
}

impl RecordCollection {
    pub fn table(&self) -> &'static str {
        match self {
            RecordCollection::Issues => "issues",
            RecordCollection::Comments => "comments",
        }
    }

    /// JSONB column holding the embedded `{id, username}` reference
    pub fn owner_field(&self) -> &'static str {
        match self {
            RecordCollection::Issues => "user_id",
            RecordCollection::Comments => "author",
        }
    }
}

/// Minimal view of an issue or comment: just enough to know who owns it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnedRecord {
    pub id: Uuid,
    pub owner: OwnerRef,
}

#[async_trait]
pub trait OwnedRecordRepository: Send + Sync {
    /// Deletes every record in the collection owned by `owner_id`
    async fn delete_by_owner(&self, owner_id: &Uuid) -> Result<u64, UserError>;
}

pub struct PgOwnedRecordRepository {
    pool: Pool,
    collection: RecordCollection,
}

impl PgOwnedRecordRepository {
    pub fn new(pool: Pool, collection: RecordCollection) -> Self {
        Self {
            pool,
            collection,
        }
    }
}

#[async_trait]
impl OwnedRecordRepository for PgOwnedRecordRepository {
    async fn delete_by_owner(&self, owner_id: &Uuid) -> Result<u64, UserError> {
        let client = self.pool.get().await?;
        let statement = format!(
            "DELETE FROM {} WHERE {}->>'id' = $1",
            self.collection.table(),
            self.collection.owner_field()
        );
        let deleted = client.execute(statement.as_str(), &[&owner_id.to_string()]).await?;
        log::debug!("Deleted {} {} owned by {}", deleted, self.collection.table(), owner_id);
        Ok(deleted)
    }
}
