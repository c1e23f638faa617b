//! Account Service - registration, login, addresses and admin user management

use super::password::{hash_password, verify_password};
use crate::audit_log;
use crate::storage::{Storage, StorageError};
use crate::utils::validation::validate_payload;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Address, Role, User, UserProfile, UserRegister, UserUpdate};
use shared::util::{now_millis, random_token, snowflake_id};

/// Random bytes in an email verification token (hex encoded, 40 chars)
const VERIFICATION_TOKEN_BYTES: usize = 20;

/// Result of a successful registration
///
/// The token goes into the verification link the caller mails out.
#[derive(Debug, Clone)]
pub struct Registration {
    pub profile: UserProfile,
    pub verification_token: String,
}

#[derive(Debug, Clone)]
pub struct AccountService {
    storage: Storage,
}

impl AccountService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    // ========== Registration & login ==========

    pub fn register(&self, payload: UserRegister) -> AppResult<Registration> {
        validate_payload(&payload)?;
        let email = normalize_email(&payload.email);
        let password_hash = hash_password(&payload.password)?;

        let txn = self.storage.begin_write()?;
        if self.storage.find_user_id_by_email_txn(&txn, &email)?.is_some() {
            return Err(AppError::new(ErrorCode::EmailAlreadyRegistered));
        }

        let now = now_millis();
        let token = random_token(VERIFICATION_TOKEN_BYTES);
        let user = User {
            id: snowflake_id(),
            name: payload.name.trim().to_string(),
            email,
            password_hash,
            verified: false,
            verification_token: Some(token.clone()),
            role: Role::User,
            addresses: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.storage.store_user(&txn, &user)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(Registration {
            profile: UserProfile::from(&user),
            verification_token: token,
        })
    }

    /// Consume a verification token and mark the account verified
    pub fn verify_email(&self, token: &str) -> AppResult<UserProfile> {
        let txn = self.storage.begin_write()?;
        let mut user = self
            .storage
            .find_user_id_by_token_txn(&txn, token.trim())?
            .map(|id| self.storage.get_user_txn(&txn, id))
            .transpose()?
            .flatten()
            .ok_or_else(|| AppError::new(ErrorCode::VerificationTokenInvalid))?;

        user.verified = true;
        user.verification_token = None;
        user.updated_at = now_millis();
        self.storage.store_user(&txn, &user)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(user_id = user.id, "Email verified");
        Ok(UserProfile::from(&user))
    }

    /// Check email and password. Unverified accounts may log in.
    pub fn authenticate(&self, email: &str, password: &str) -> AppResult<UserProfile> {
        let Some(user) = self.storage.find_user_by_email(&normalize_email(email))? else {
            return Err(AppError::invalid_credentials());
        };
        if !verify_password(password, &user.password_hash) {
            tracing::warn!(user_id = user.id, "Failed login attempt");
            return Err(AppError::invalid_credentials());
        }
        Ok(UserProfile::from(&user))
    }

    // ========== Self-service ==========

    pub fn profile(&self, requester_id: i64, user_id: i64) -> AppResult<UserProfile> {
        ensure_owner(requester_id, user_id)?;
        let user = self.load_user(user_id)?;
        Ok(UserProfile::from(&user))
    }

    pub fn addresses(&self, requester_id: i64, user_id: i64) -> AppResult<Vec<Address>> {
        ensure_owner(requester_id, user_id)?;
        Ok(self.load_user(user_id)?.addresses)
    }

    /// Save a shipping address; returns the full address book
    pub fn add_address(
        &self,
        requester_id: i64,
        user_id: i64,
        address: Address,
    ) -> AppResult<Vec<Address>> {
        ensure_owner(requester_id, user_id)?;
        validate_payload(&address)?;

        let txn = self.storage.begin_write()?;
        let mut user = self
            .storage
            .get_user_txn(&txn, user_id)?
            .ok_or_else(|| AppError::user_not_found(user_id))?;

        user.addresses.push(address);
        user.updated_at = now_millis();
        self.storage.store_user(&txn, &user)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(user_id, count = user.addresses.len(), "Address added");
        Ok(user.addresses)
    }

    // ========== Admin operations ==========

    /// All users, newest first
    pub fn list_users(&self) -> AppResult<Vec<UserProfile>> {
        let mut users = self.storage.get_all_users()?;
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users.iter().map(UserProfile::from).collect())
    }

    pub fn update_user(&self, user_id: i64, payload: UserUpdate) -> AppResult<UserProfile> {
        validate_payload(&payload)?;
        let password_hash = payload.password.as_deref().map(hash_password).transpose()?;

        let txn = self.storage.begin_write()?;
        let mut user = self
            .storage
            .get_user_txn(&txn, user_id)?
            .ok_or_else(|| AppError::user_not_found(user_id))?;

        if let Some(email) = payload.email {
            let email = normalize_email(&email);
            if email != user.email {
                let taken = self.storage.find_user_id_by_email_txn(&txn, &email)?;
                if taken.is_some_and(|id| id != user_id) {
                    return Err(AppError::new(ErrorCode::EmailAlreadyRegistered));
                }
                user.email = email;
            }
        }
        if let Some(name) = payload.name {
            user.name = name.trim().to_string();
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        if let Some(role) = payload.role {
            user.role = role;
        }
        if let Some(verified) = payload.verified {
            user.verified = verified;
            if verified {
                user.verification_token = None;
            }
        }
        user.updated_at = now_millis();

        self.storage.store_user(&txn, &user)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(user_id, "User updated");
        audit_log!("admin", "update_user", format!("user:{user_id}"));
        Ok(UserProfile::from(&user))
    }

    /// Hard delete. The user's orders stay in the order table.
    pub fn delete_user(&self, user_id: i64) -> AppResult<()> {
        let txn = self.storage.begin_write()?;
        let user = self
            .storage
            .get_user_txn(&txn, user_id)?
            .ok_or_else(|| AppError::user_not_found(user_id))?;

        self.storage.remove_user(&txn, &user)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(user_id, "User deleted");
        audit_log!("admin", "delete_user", format!("user:{user_id}"));
        Ok(())
    }

    fn load_user(&self, user_id: i64) -> AppResult<User> {
        self.storage
            .get_user(user_id)?
            .ok_or_else(|| AppError::user_not_found(user_id))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn ensure_owner(requester_id: i64, user_id: i64) -> AppResult<()> {
    if requester_id != user_id {
        tracing::warn!(requester_id, user_id, "Access to another user's account");
        return Err(AppError::not_owner("Unauthorized access to this account"));
    }
    Ok(())
}
