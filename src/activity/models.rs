use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::user::models::OwnerRef;

/// What the user did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityCategory {
    #[serde(rename = "Upload Photo")]
    UploadPhoto,
    #[serde(rename = "Update Profile")]
    UpdateProfile,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::UploadPhoto => "Upload Photo",
            ActivityCategory::UpdateProfile => "Update Profile",
        }
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit entry. Never mutated after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub category: ActivityCategory,
    pub user_id: OwnerRef,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    pub fn new(category: ActivityCategory, user_id: OwnerRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            user_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_value(ActivityCategory::UpdateProfile).unwrap();
        assert_eq!(json, "Update Profile");
        assert_eq!(ActivityCategory::UploadPhoto.to_string(), "Upload Photo");
    }
}
