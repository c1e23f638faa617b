//! User Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Shipping address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Address {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub mobile_no: String,
    #[validate(length(min = 1, max = 50))]
    pub house_no: String,
    #[validate(length(min = 1, max = 200))]
    pub street: String,
    #[serde(default)]
    pub landmark: String,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: String,
}

/// User entity as stored (includes credentials)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Stored lowercase
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub verified: bool,
    pub verification_token: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub addresses: Vec<Address>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// User response (without password hash or token)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub verified: bool,
    pub role: Role,
    pub addresses: Vec<Address>,
    pub created_at: i64,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            verified: user.verified,
            role: user.role,
            addresses: user.addresses.clone(),
            created_at: user.created_at,
        }
    }
}

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserRegister {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

/// Admin update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 128))]
    pub password: Option<String>,
    pub role: Option<Role>,
    pub verified: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> Address {
        Address {
            name: "Asha".to_string(),
            mobile_no: "9876543210".to_string(),
            house_no: "12B".to_string(),
            street: "MG Road".to_string(),
            landmark: String::new(),
            postal_code: "560001".to_string(),
        }
    }

    #[test]
    fn test_address_validation() {
        assert!(address().validate().is_ok());

        let mut missing_street = address();
        missing_street.street.clear();
        let errors = missing_street.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("street"));
    }

    #[test]
    fn test_register_rejects_bad_email() {
        let payload = UserRegister {
            name: "Asha".to_string(),
            email: "not-an-email".to_string(),
            password: "secret123".to_string(),
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_profile_hides_credentials() {
        let user = User {
            id: 1,
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            verified: false,
            verification_token: Some("abc".to_string()),
            role: Role::User,
            addresses: vec![address()],
            created_at: 0,
            updated_at: 0,
        };
        let json = serde_json::to_string(&UserProfile::from(&user)).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("verification_token"));
        assert!(json.contains("\"role\":\"user\""));
    }
}
