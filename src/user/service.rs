//! User Service Module
//!
//! Business logic for the admin and self-service user endpoints. Every method takes the
//! capability that authorises it, performs its storage calls in order and stops at the
//! first failure.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::activity::models::{Activity, ActivityCategory};
use crate::auth::{ActingUser, AdminCapability};
use crate::store::Repositories;
use crate::upload::photo::{PhotoProcessor, UploadedPhoto};
use crate::user::{
    dto::{ProfileUpdate, UserChanges},
    error::UserError,
    models::{OwnerRef, User},
};

/// Service for managing user-related operations
pub struct UserService {
    repos: Repositories,
    photos: PhotoProcessor,
}

impl UserService {
    /// Creates a new UserService with the given dependencies
    pub fn new(repos: Repositories, photos: PhotoProcessor) -> Self {
        Self {
            repos,
            photos,
        }
    }

    pub fn photos(&self) -> &PhotoProcessor {
        &self.photos
    }

    /// Every user in the store
    pub async fn list_users(&self, _admin: &AdminCapability) -> Result<Vec<User>, UserError> {
        self.repos.users.find_all().await
    }

    /// Gets a user by ID on behalf of an administrator
    pub async fn get_user(&self, _admin: &AdminCapability, id: &Uuid) -> Result<User, UserError> {
        self.find_user(id).await
    }

    /// The acting user's own record
    pub async fn get_me(&self, acting: &ActingUser) -> Result<User, UserError> {
        self.find_user(&acting.id).await
    }

    async fn find_user(&self, id: &Uuid) -> Result<User, UserError> {
        self.repos.users.find_by_id(id).await?.ok_or(UserError::UserNotFound)
    }

    /// Admin update: any field except the password, validated
    pub async fn update_user(
        &self,
        admin: &AdminCapability,
        id: &Uuid,
        changes: UserChanges,
    ) -> Result<User, UserError> {
        let changes = changes.normalized();
        changes.validate()?;

        let user = self
            .repos
            .users
            .find_by_id_and_update(id, &changes)
            .await?
            .ok_or(UserError::UserNotFound)?;

        log::info!("Admin {} updated user {}", admin.acting().id, user.id);
        Ok(user)
    }

    /// Resize and store a new avatar, then record it on the user
    ///
    /// Returns the stored filename.
    pub async fn upload_photo(
        &self,
        acting: &ActingUser,
        photo: UploadedPhoto,
    ) -> Result<String, UserError> {
        let user = self.find_user(&acting.id).await?;

        let filename = self.photos.store(&user.id, photo).await?;

        // Only the image changes, so this write skips field validation.
        self.repos.users.set_image(&user.id, &filename).await?;
        self.record(ActivityCategory::UploadPhoto, &user.owner_ref()).await?;

        Ok(filename)
    }

    /// Self-service update of name and email
    ///
    /// `bag` is the raw submitted body. Password fields reject the request; everything
    /// outside name and email is dropped.
    pub async fn update_profile(
        &self,
        acting: &ActingUser,
        bag: &Map<String, Value>,
    ) -> Result<User, UserError> {
        let changes = UserChanges::from(ProfileUpdate::from_bag(bag)?).normalized();
        changes.validate()?;

        let user = self
            .repos
            .users
            .find_by_id_and_update(&acting.id, &changes)
            .await?
            .ok_or(UserError::UserNotFound)?;

        self.record(ActivityCategory::UpdateProfile, &acting.owner_ref()).await?;
        Ok(user)
    }

    /// Delete the acting user and everything they own
    ///
    /// Four independent deletes, in order. A failure stops the sequence and leaves the
    /// remaining collections untouched; re-running is safe.
    pub async fn delete_account(&self, acting: &ActingUser) -> Result<(), UserError> {
        let id = acting.id;

        let users = self.repos.users.delete_one(&id).await.inspect_err(|e| {
            log::error!("Account deletion for {id} failed deleting the user: {e}")
        })?;
        let issues = self.repos.issues.delete_by_owner(&id).await.inspect_err(|e| {
            log::error!("Account deletion for {id} failed deleting issues: {e}")
        })?;
        let comments = self.repos.comments.delete_by_owner(&id).await.inspect_err(|e| {
            log::error!("Account deletion for {id} failed deleting comments: {e}")
        })?;
        let activities = self.repos.activities.delete_by_user(&id).await.inspect_err(|e| {
            log::error!("Account deletion for {id} failed deleting activities: {e}")
        })?;

        log::info!(
            "Deleted account {id}: {users} user, {issues} issues, {comments} comments, {activities} activities"
        );
        Ok(())
    }

    async fn record(
        &self,
        category: ActivityCategory,
        owner: &OwnerRef,
    ) -> Result<(), UserError> {
        log::debug!("Recording '{}' for {}", category, owner.id);
        self.repos.activities.insert(&Activity::new(category, owner.clone())).await
    }
}
