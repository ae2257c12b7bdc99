//! User shapes.

use database::validation::{normalize_email, validate_email, validate_password};
use database::{NewUser, User};
use serde::{Deserialize, Serialize};

use crate::{Validate, ValidationError};

/// Signup body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserCreate {
    pub email: String,
    /// Plaintext, at least 8 characters. Never persisted.
    pub password: String,
}

impl Validate for UserCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

impl UserCreate {
    /// Validate, hash the password with `hasher`, and drop the plaintext.
    pub fn into_new_user<F>(self, hasher: F) -> Result<NewUser, ValidationError>
    where
        F: FnOnce(&str) -> String,
    {
        self.validate()?;
        let hashed_password = hasher(&self.password);
        Ok(NewUser {
            email: normalize_email(&self.email),
            hashed_password,
            is_admin: false,
        })
    }
}

/// Account as returned to clients. Carries no password material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOut {
    pub email: String,
    pub id: i64,
    pub is_admin: bool,
}

impl From<&User> for UserOut {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            is_admin: user.is_admin,
        }
    }
}

/// Partial account update. Admin-only for `is_admin`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

impl Validate for UserUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        match &self.password {
            Some(password) => validate_password(password),
            None => Ok(()),
        }
    }
}
