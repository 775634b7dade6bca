//! User domain models
//!
//! Core user models are aligned with the `users` collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::user::error::UserError;

pub const DEFAULT_IMAGE: &str = "default.jpg";

/// User role enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::User => write!(f, "user"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for UserRole {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            other => Err(UserError::DatabaseError(format!("Unknown role in store: {other}"))),
        }
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,

    #[serde(skip_serializing, default)]
    pub password: String,

    pub role: UserRole,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Fresh account with the default avatar
    pub fn new(name: &str, email: &str, username: &str, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            username: username.to_string(),
            password: String::new(),
            role,
            image: DEFAULT_IMAGE.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Snapshot embedded into records this user owns
    pub fn owner_ref(&self) -> OwnerRef {
        OwnerRef {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// Embedded reference to the owning user, as stored on issues, comments and activities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRef {
    pub id: Uuid,
    pub username: String,
}
