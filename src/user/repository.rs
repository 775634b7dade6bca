//! User Repository Module
//!
//! Repository interface for the `users` collection and its PostgreSQL implementation.
//! Each method is a single statement; nothing here spans more than one row or table.

use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::user::dto::UserChanges;
use crate::user::error::UserError;
use crate::user::models::User;

/// Repository trait defining operations for user data persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns every user, unpaginated
    async fn find_all(&self) -> Result<Vec<User>, UserError>;

    /// Finds a user by their unique ID
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, UserError>;

    /// Applies `changes` and returns the post-update record, or `None` if the ID is unknown
    async fn find_by_id_and_update(
        &self,
        id: &Uuid,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserError>;

    /// Overwrites the avatar filename without running field validation
    async fn set_image(&self, id: &Uuid, image: &str) -> Result<(), UserError>;

    /// Deletes a user by ID; returns how many rows went away
    async fn delete_one(&self, id: &Uuid) -> Result<u64, UserError>;
}

const SELECT_ALL_USERS: &str = "SELECT id, name, email, username, password, role, image, created_at \
     FROM users ORDER BY created_at";

const SELECT_USER_BY_ID: &str = "SELECT id, name, email, username, password, role, image, created_at \
     FROM users WHERE id = $1";

const UPDATE_USER_RETURNING: &str = r#"
    UPDATE users SET
        name = COALESCE($2, name),
        email = COALESCE($3, email),
        username = COALESCE($4, username),
        image = COALESCE($5, image),
        role = COALESCE($6, role)
    WHERE id = $1
    RETURNING id, name, email, username, password, role, image, created_at
"#;

/// PostgreSQL implementation of the UserRepository
pub struct PgUserRepository {
    pool: Pool,
}

impl PgUserRepository {
    /// Creates a new PostgreSQL user repository
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
        }
    }
}

fn user_from_row(row: &Row) -> Result<User, UserError> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        username: row.try_get("username")?,
        password: row.try_get("password")?,
        role: role.parse()?,
        image: row.try_get("image")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, UserError> {
        let client = self.pool.get().await?;
        let rows = client.query(SELECT_ALL_USERS, &[]).await?;

        rows.iter().map(user_from_row).collect()
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, UserError> {
        let client = self.pool.get().await?;
        let row = client.query_opt(SELECT_USER_BY_ID, &[id]).await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_id_and_update(
        &self,
        id: &Uuid,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserError> {
        let client = self.pool.get().await?;
        let role = changes.role.map(|role| role.to_string());
        let row = client
            .query_opt(
                UPDATE_USER_RETURNING,
                &[id, &changes.name, &changes.email, &changes.username, &changes.image, &role],
            )
            .await?;

        log::debug!("Updated user {}: {}", id, row.is_some());
        row.as_ref().map(user_from_row).transpose()
    }

    async fn set_image(&self, id: &Uuid, image: &str) -> Result<(), UserError> {
        let client = self.pool.get().await?;
        client.execute("UPDATE users SET image = $2 WHERE id = $1", &[id, &image]).await?;
        log::debug!("Set image for user {} to {}", id, image);
        Ok(())
    }

    async fn delete_one(&self, id: &Uuid) -> Result<u64, UserError> {
        let client = self.pool.get().await?;
        let deleted = client.execute("DELETE FROM users WHERE id = $1", &[id]).await?;
        log::debug!("Deleted {} user row(s) for {}", deleted, id);
        Ok(deleted)
    }
}
