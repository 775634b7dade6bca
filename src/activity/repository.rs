//! Activity repository
//!
//! Append-only writes plus the purge used by account deletion.

use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::types::Json;
use uuid::Uuid;

use crate::activity::models::Activity;
use crate::user::error::UserError;

/// Write side of the activity collection
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn insert(&self, activity: &Activity) -> Result<(), UserError>;

    /// Removes every activity whose `user_id.id` matches
    async fn delete_by_user(&self, user_id: &Uuid) -> Result<u64, UserError>;
}

pub struct PgActivityRepository {
    pool: Pool,
}

impl PgActivityRepository {
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
        }
    }
}

#[async_trait]
impl ActivityRepository for PgActivityRepository {
    async fn insert(&self, activity: &Activity) -> Result<(), UserError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO activities (id, category, user_id, created_at) VALUES ($1, $2, $3, $4)",
                &[
                    &activity.id,
                    &activity.category.as_str(),
                    &Json(&activity.user_id),
                    &activity.created_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn delete_by_user(&self, user_id: &Uuid) -> Result<u64, UserError> {
        let client = self.pool.get().await?;
        let deleted = client
            .execute("DELETE FROM activities WHERE user_id->>'id' = $1", &[&user_id.to_string()])
            .await?;
        log::debug!("Deleted {} activities for {}", deleted, user_id);
        Ok(deleted)
    }
}
