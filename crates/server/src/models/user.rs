//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use halcyon_core::{Email, Role, UserId};

use crate::store::StoreError;
use crate::store::collection::Entity;

/// Embedded member profile. Everything here is optional and supplied by
/// the member over time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub health_condition: Option<String>,
}

/// A platform user account.
///
/// The email is lowercase-normalized and unique at write time (backed by
/// the store's unique-key mechanism). The password hash is stored but
/// never leaves through a read projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a user. The password arrives in clear and is
/// hashed before `User::from_new` ever sees it.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

impl User {
    /// Build a user record from create parameters and a password hash.
    ///
    /// Assigns a fresh id when the caller did not supply one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` when the name is empty or the
    /// email does not parse.
    pub fn from_new(new: NewUser, password_hash: String) -> Result<Self, StoreError> {
        let email =
            Email::parse(&new.email).map_err(|e| StoreError::Validation(e.to_string()))?;
        let now = Utc::now();

        let user = Self {
            id: new.id.unwrap_or_else(UserId::generate),
            name: new.name,
            email,
            password_hash,
            role: new.role.unwrap_or_default(),
            profile: new.profile.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        user.validate()?;
        Ok(user)
    }

    /// The read projection: everything except the password hash.
    #[must_use]
    pub fn into_view(self) -> UserView {
        UserView {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role,
            profile: self.profile,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";

    // The password flow owns the hash; a generic patch may not touch it.
    const GUARDED_FIELDS: &'static [&'static str] = &["password_hash"];

    fn id(&self) -> Uuid {
        self.id.as_uuid()
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.as_str().to_string())
    }

    fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::Validation("name is required".to_string()));
        }
        if self.password_hash.is_empty() {
            return Err(StoreError::Validation(
                "password hash is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// User read projection. Identical from either backend; the password hash
/// is excluded in both modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            id: None,
            name: "Mira Chen".to_string(),
            email: email.to_string(),
            role: None,
            profile: None,
        }
    }

    #[test]
    fn test_from_new_assigns_id_and_defaults() {
        let user = User::from_new(new_user("mira@example.com"), "hash".to_string()).unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_from_new_keeps_supplied_id() {
        let id = UserId::generate();
        let mut new = new_user("mira@example.com");
        new.id = Some(id);
        let user = User::from_new(new, "hash".to_string()).unwrap();
        assert_eq!(user.id, id);
    }

    #[test]
    fn test_from_new_normalizes_email() {
        let user = User::from_new(new_user("Mira@Example.COM"), "hash".to_string()).unwrap();
        assert_eq!(user.email.as_str(), "mira@example.com");
    }

    #[test]
    fn test_from_new_rejects_bad_email() {
        let result = User::from_new(new_user("not-an-email"), "hash".to_string());
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_from_new_rejects_empty_name() {
        let mut new = new_user("mira@example.com");
        new.name = "  ".to_string();
        let result = User::from_new(new, "hash".to_string());
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_view_has_no_password_hash() {
        let user = User::from_new(new_user("mira@example.com"), "hash".to_string()).unwrap();
        let json = serde_json::to_value(user.into_view()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("email").is_some());
    }

    #[test]
    fn test_unique_key_is_email() {
        let user = User::from_new(new_user("mira@example.com"), "hash".to_string()).unwrap();
        assert_eq!(
            Entity::unique_key(&user),
            Some("mira@example.com".to_string())
        );
    }
}
