//! User Data Transfer Objects
//!
//! Typed request bodies for the admin and self-service update paths, plus the
//! response envelopes each endpoint returns.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::user::error::UserError;
use crate::user::models::{User, UserRole};
use crate::utils::{contains_any, filter_fields};

/// Keys that route a caller to the password-change flow instead
pub const PASSWORD_FIELDS: [&str; 2] = ["password", "passwordConfirm"];

/// Keys a user may change on their own profile
pub const PROFILE_FIELDS: [&str; 2] = ["name", "email"];

const NAME_MAX_LEN: usize = 100;
const USERNAME_MAX_LEN: usize = 50;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_+\-]+(\.[A-Za-z0-9_+\-]+)*@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// Changeset applied by find-by-id-and-update; `None` leaves the stored value alone
///
/// Admins send this directly. There is no password field, so a submitted password is
/// dropped during deserialisation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub image: Option<String>,
    pub role: Option<UserRole>,
}

impl UserChanges {
    /// Field checks run before every validated update
    pub fn validate(&self) -> Result<(), UserError> {
        let mut problems = Vec::new();

        if let Some(name) = &self.name {
            let name = name.trim();
            if name.is_empty() {
                problems.push("name: can't be empty".to_string());
            } else if name.chars().count() > NAME_MAX_LEN {
                problems.push(format!("name: at most {NAME_MAX_LEN} characters"));
            }
        }

        if let Some(email) = &self.email {
            if !EMAIL_REGEX.is_match(email.trim()) {
                problems.push("email: please provide a valid email".to_string());
            }
        }

        if let Some(username) = &self.username {
            if username.is_empty() || username.chars().any(char::is_whitespace) {
                problems.push("username: must be non-empty with no whitespace".to_string());
            } else if username.chars().count() > USERNAME_MAX_LEN {
                problems.push(format!("username: at most {USERNAME_MAX_LEN} characters"));
            }
        }

        if let Some(image) = &self.image {
            if image.trim().is_empty() {
                problems.push("image: can't be empty".to_string());
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(UserError::ValidationError(problems.join(", ")))
        }
    }

    /// Trim the free-text fields the way they are stored
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|name| name.trim().to_string());
        self.email = self.email.map(|email| email.trim().to_lowercase());
        self
    }
}

/// Self-service profile update: name and email only
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl ProfileUpdate {
    /// Turn a raw submitted bag into a profile update
    ///
    /// Password fields reject the whole request; any key other than name and email is
    /// dropped without complaint.
    pub fn from_bag(bag: &Map<String, Value>) -> Result<Self, UserError> {
        if contains_any(bag, &PASSWORD_FIELDS) {
            return Err(UserError::PasswordUpdateNotAllowed);
        }

        let filtered = filter_fields(bag, &PROFILE_FIELDS);
        Ok(serde_json::from_value(Value::Object(filtered))?)
    }
}

impl From<ProfileUpdate> for UserChanges {
    fn from(update: ProfileUpdate) -> Self {
        Self {
            name: update.name,
            email: update.email,
            ..Self::default()
        }
    }
}

/// Admin listing: `{status, results, users}`
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub status: &'static str,
    pub results: usize,
    pub users: Vec<User>,
}

impl UserListResponse {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            status: "success",
            results: users.len(),
            users,
        }
    }
}

/// Single user: `{status, user}`
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub status: &'static str,
    pub user: User,
}

impl UserResponse {
    pub fn new(user: User) -> Self {
        Self {
            status: "success",
            user,
        }
    }
}

/// Profile update: `{status, data: {user}}`
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub status: &'static str,
    pub data: ProfileData,
}

#[derive(Debug, Serialize)]
pub struct ProfileData {
    pub user: User,
}

impl ProfileResponse {
    pub fn new(user: User) -> Self {
        Self {
            status: "success",
            data: ProfileData {
                user,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_password_field_always_rejected() {
        let bodies = [
            json!({ "password": "x" }),
            json!({ "password": "x", "name": "Bob" }),
            json!({ "passwordConfirm": "x", "email": "b@x.com" }),
        ];

        for body in bodies {
            let result = ProfileUpdate::from_bag(&bag(body));
            assert!(matches!(result, Err(UserError::PasswordUpdateNotAllowed)));
        }
    }

    #[test]
    fn test_unknown_fields_dropped() {
        let update = ProfileUpdate::from_bag(&bag(json!({ "name": "A", "admin": true }))).unwrap();
        assert_eq!(
            update,
            ProfileUpdate {
                name: Some("A".to_string()),
                email: None,
            }
        );
    }

    #[test]
    fn test_non_string_name_is_validation_error() {
        let result = ProfileUpdate::from_bag(&bag(json!({ "name": 42 })));
        assert!(matches!(result, Err(UserError::ValidationError(_))));
    }

    #[test]
    fn test_admin_changes_ignore_password() {
        let changes: UserChanges =
            serde_json::from_value(json!({ "role": "admin", "password": "secret" })).unwrap();
        assert_eq!(changes.role, Some(UserRole::Admin));
        assert_eq!(changes.name, None);
    }

    #[test]
    fn test_validation_rules() {
        let ok = UserChanges {
            name: Some("Bob".to_string()),
            email: Some("b@x.com".to_string()),
            username: Some("bob_99".to_string()),
            ..UserChanges::default()
        };
        assert!(ok.validate().is_ok());

        let bad_email = UserChanges {
            email: Some("not-an-email".to_string()),
            ..UserChanges::default()
        };
        assert!(matches!(bad_email.validate(), Err(UserError::ValidationError(msg)) if msg.contains("email")));

        let blank_name = UserChanges {
            name: Some("   ".to_string()),
            ..UserChanges::default()
        };
        assert!(blank_name.validate().is_err());

        let spaced_username = UserChanges {
            username: Some("bob smith".to_string()),
            ..UserChanges::default()
        };
        assert!(spaced_username.validate().is_err());
    }

    #[test]
    fn test_normalized_trims_and_lowercases_email() {
        let changes = UserChanges {
            name: Some("  Bob ".to_string()),
            email: Some(" Bob@X.com ".to_string()),
            ..UserChanges::default()
        }
        .normalized();

        assert_eq!(changes.name.as_deref(), Some("Bob"));
        assert_eq!(changes.email.as_deref(), Some("bob@x.com"));
    }

    #[test]
    fn test_profile_envelope_shape() {
        let user = User::new("Bob", "b@x.com", "bob", UserRole::User);
        let json = serde_json::to_value(ProfileResponse::new(user)).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["user"]["name"], "Bob");
    }
}
