//! Password hashing and the user rows that own the hashes.
//!
//! All methods are blocking (Argon2 and SQLite); call them from
//! `spawn_blocking`.

use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{SaltString, rand_core::OsRng},
};
use factguard_db::Database;
use factguard_db::models::UserRow;
use factguard_types::models::Role;
use tracing::{error, info};

use crate::error::ApiError;
use crate::settings::Settings;

#[derive(Clone)]
pub struct CredentialStore {
    db: Arc<Database>,
    argon2: Argon2<'static>,
    admin_emails: Arc<Vec<String>>,
}

impl CredentialStore {
    pub fn new(db: Arc<Database>, settings: &Settings) -> anyhow::Result<Self> {
        let params = Params::new(settings.hash_memory_kib, settings.hash_iterations, 1, None)
            .map_err(|e| anyhow::anyhow!("Invalid Argon2 parameters: {}", e))?;

        Ok(Self {
            db,
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            admin_emails: Arc::new(settings.admin_emails.clone()),
        })
    }

    /// Registers an account and returns its id and role. A taken email is
    /// reported by the store's unique constraint.
    pub fn create(
        &self,
        username: &str,
        email: &str,
        password: &str,
        political_leaning: Option<&str>,
    ) -> Result<(i64, Role), ApiError> {
        if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "Username, email and password are required".into(),
            ));
        }

        let role = if self
            .admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(email))
        {
            Role::Admin
        } else {
            Role::User
        };

        let hash = self.hash(password)?;
        let id = self
            .db
            .create_user(username, email, &hash, role, political_leaning)?;

        info!("Registered user {} ({})", id, role);
        Ok((id, role))
    }

    /// Unknown email and wrong password are reported separately.
    pub fn verify(&self, email: &str, password: &str) -> Result<UserRow, ApiError> {
        let user = self
            .db
            .get_user_by_email(email)?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

        if !self.matches(password, &user.password)? {
            return Err(ApiError::InvalidCredentials);
        }
        Ok(user)
    }

    pub fn update_profile(
        &self,
        user_id: i64,
        name: &str,
        email: &str,
        political_leaning: Option<&str>,
    ) -> Result<(), ApiError> {
        if name.trim().is_empty() || email.trim().is_empty() {
            return Err(ApiError::Validation("Name and email are required".into()));
        }
        self.db
            .update_profile(user_id, name, email, political_leaning)
            .map_err(|e| match ApiError::from(e) {
                ApiError::NotFound(_) => ApiError::NotFound("User not found".into()),
                other => other,
            })
    }

    /// Rotates the password after re-checking the current one.
    pub fn update_password(&self, user_id: i64, old: &str, new: &str) -> Result<(), ApiError> {
        if old.is_empty() || new.is_empty() {
            return Err(ApiError::Validation(
                "Old and new passwords are required".into(),
            ));
        }
        if old == new {
            return Err(ApiError::Validation(
                "New password must differ from the old one".into(),
            ));
        }

        let user = self
            .db
            .get_user_by_id(user_id)?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
        if !self.matches(old, &user.password)? {
            return Err(ApiError::InvalidCredentials);
        }

        let hash = self.hash(new)?;
        self.db.update_password(user_id, &hash)?;
        info!("Password rotated for user {}", user_id);
        Ok(())
    }

    /// Deletes the user row only; owned resources are the caller's job.
    pub fn delete_user(&self, user_id: i64) -> Result<(), ApiError> {
        self.db.delete_user(user_id).map_err(|e| match ApiError::from(e) {
            ApiError::NotFound(_) => ApiError::NotFound("Account not found".into()),
            other => other,
        })
    }

    fn hash(&self, password: &str) -> Result<String, ApiError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                error!("Password hashing failed: {}", e);
                ApiError::Internal
            })
    }

    /// Constant-time comparison against a stored PHC string.
    fn matches(&self, password: &str, stored: &str) -> Result<bool, ApiError> {
        let parsed = PasswordHash::new(stored).map_err(|e| {
            error!("Stored password hash is unreadable: {}", e);
            ApiError::Internal
        })?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => {
                error!("Password verification failed: {}", e);
                Err(ApiError::Internal)
            }
        }
    }
}
