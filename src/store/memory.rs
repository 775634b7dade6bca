//! In-memory store
//!
//! Implements every repository trait over mutex-guarded maps. Used by the `memory`
//! storage backend during local development and by the test suites.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::activity::models::Activity;
use crate::activity::repository::ActivityRepository;
use crate::records::{OwnedRecord, OwnedRecordRepository, RecordCollection};
use crate::user::dto::UserChanges;
use crate::user::error::UserError;
use crate::user::models::{OwnerRef, User};
use crate::user::repository::UserRepository;

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    activities: Vec<Activity>,
    issues: Vec<OwnedRecord>,
    comments: Vec<OwnedRecord>,
}

#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Collections>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, UserError> {
        self.inner
            .lock()
            .map_err(|_| UserError::DatabaseError("in-memory store lock poisoned".to_string()))
    }

    /// Seed a user, replacing any existing one with the same ID
    pub fn insert_user(&self, user: User) -> Result<(), UserError> {
        self.lock()?.users.insert(user.id, user);
        Ok(())
    }

    /// Seed an issue or comment owned by `owner`
    pub fn insert_record(
        &self,
        collection: RecordCollection,
        owner: OwnerRef,
    ) -> Result<Uuid, UserError> {
        let record = OwnedRecord {
            id: Uuid::new_v4(),
            owner,
        };
        let id = record.id;
        let mut guard = self.lock()?;
        match collection {
            RecordCollection::Issues => guard.issues.push(record),
            RecordCollection::Comments => guard.comments.push(record),
        }
        Ok(id)
    }

    pub fn activities_for(&self, user_id: &Uuid) -> Result<Vec<Activity>, UserError> {
        Ok(self
            .lock()?
            .activities
            .iter()
            .filter(|activity| activity.user_id.id == *user_id)
            .cloned()
            .collect())
    }

    pub fn records_owned_by(
        &self,
        collection: RecordCollection,
        owner_id: &Uuid,
    ) -> Result<usize, UserError> {
        let guard = self.lock()?;
        let records = match collection {
            RecordCollection::Issues => &guard.issues,
            RecordCollection::Comments => &guard.comments,
        };
        Ok(records.iter().filter(|record| record.owner.id == *owner_id).count())
    }

    /// Repository view over one of the owned-record collections
    pub fn records(self: &Arc<Self>, collection: RecordCollection) -> InMemoryRecords {
        InMemoryRecords {
            store: self.clone(),
            collection,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<User>, UserError> {
        let mut users: Vec<User> = self.lock()?.users.values().cloned().collect();
        users.sort_by_key(|user| user.created_at);
        Ok(users)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, UserError> {
        Ok(self.lock()?.users.get(id).cloned())
    }

    async fn find_by_id_and_update(
        &self,
        id: &Uuid,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserError> {
        let mut guard = self.lock()?;

        if let Some(email) = &changes.email {
            if guard.users.values().any(|other| other.id != *id && other.email == *email) {
                return Err(UserError::DuplicateField("users_email_key".to_string()));
            }
        }
        if let Some(username) = &changes.username {
            if guard.users.values().any(|other| other.id != *id && other.username == *username) {
                return Err(UserError::DuplicateField("users_username_key".to_string()));
            }
        }

        let Some(user) = guard.users.get_mut(id) else {
            return Ok(None);
        };

        if let Some(name) = &changes.name {
            user.name = name.clone();
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(username) = &changes.username {
            user.username = username.clone();
        }
        if let Some(image) = &changes.image {
            user.image = image.clone();
        }
        if let Some(role) = changes.role {
            user.role = role;
        }

        Ok(Some(user.clone()))
    }

    async fn set_image(&self, id: &Uuid, image: &str) -> Result<(), UserError> {
        if let Some(user) = self.lock()?.users.get_mut(id) {
            user.image = image.to_string();
        }
        Ok(())
    }

    async fn delete_one(&self, id: &Uuid) -> Result<u64, UserError> {
        Ok(u64::from(self.lock()?.users.remove(id).is_some()))
    }
}

#[async_trait]
impl ActivityRepository for InMemoryStore {
    async fn insert(&self, activity: &Activity) -> Result<(), UserError> {
        self.lock()?.activities.push(activity.clone());
        Ok(())
    }

    async fn delete_by_user(&self, user_id: &Uuid) -> Result<u64, UserError> {
        let mut guard = self.lock()?;
        let before = guard.activities.len();
        guard.activities.retain(|activity| activity.user_id.id != *user_id);
        Ok((before - guard.activities.len()) as u64)
    }
}

/// One owned-record collection inside an [`InMemoryStore`]
pub struct InMemoryRecords {
    store: Arc<InMemoryStore>,
    collection: RecordCollection,
}

#[async_trait]
impl OwnedRecordRepository for InMemoryRecords {
    async fn delete_by_owner(&self, owner_id: &Uuid) -> Result<u64, UserError> {
        let mut guard = self.store.lock()?;
        let records = match self.collection {
            RecordCollection::Issues => &mut guard.issues,
            RecordCollection::Comments => &mut guard.comments,
        };
        let before = records.len();
        records.retain(|record| record.owner.id != *owner_id);
        Ok((before - records.len()) as u64)
    }
}
