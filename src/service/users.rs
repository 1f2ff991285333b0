use chrono::Utc;
use serde::Deserialize;

use super::validation::{require, validate_email, validate_password, validate_username};
use super::{ServiceError, ServiceResult};
use crate::auth::{CredentialVerifier, PasswordManager, RouteClass, authorize, authorize_fetched};
use crate::error::Error;
use crate::store::Store;
use crate::types::{Principal, Role, User};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountDetails {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// Account created by an administrator, with an explicit role.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    #[serde(flatten)]
    pub details: AccountDetails,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Partial update of an account. Absent or empty fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
}

pub struct UserService<'a> {
    store: &'a dyn Store,
    passwords: &'a PasswordManager,
    credentials: &'a CredentialVerifier,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn duplicate_account(e: Error) -> ServiceError {
    match e {
        Error::AlreadyExists => ServiceError::invalid("username or email already exists"),
        e => ServiceError::Internal(e),
    }
}

impl<'a> UserService<'a> {
    pub fn new(
        store: &'a dyn Store,
        passwords: &'a PasswordManager,
        credentials: &'a CredentialVerifier,
    ) -> Self {
        Self {
            store,
            passwords,
            credentials,
        }
    }

    /// Validates and stores a new account with the given role.
    pub fn register(&self, details: AccountDetails, role: Role) -> ServiceResult<User> {
        validate_username(&details.username)?;
        validate_password(&details.password)?;
        require("name", &details.name)?;
        require("email", &details.email)?;
        validate_email(&details.email)?;

        if self.store.get_user_by_username(&details.username)?.is_some() {
            return Err(ServiceError::invalid("username already exists"));
        }

        let now = Utc::now();
        let mut user = User {
            id: 0,
            username: details.username,
            password_hash: self.passwords.hash(&details.password)?,
            role,
            name: details.name,
            contact: details.contact,
            email: details.email,
            created_at: now,
            updated_at: now,
        };
        user.id = self.store.create_user(&user).map_err(duplicate_account)?;

        tracing::info!(user_id = user.id, role = %user.role, "Created user {}", user.username);
        Ok(user)
    }

    /// Self-service registration. Creates an owner account and returns a credential for it.
    pub fn signup(&self, details: AccountDetails) -> ServiceResult<String> {
        require("username", &details.username)?;
        require("password", &details.password)?;
        require("name", &details.name)?;
        require("email", &details.email)?;
        require("contact", &details.contact)?;

        let user = self.register(details, Role::Owner)?;
        Ok(self.credentials.issue(&user)?)
    }

    pub fn login(&self, request: LoginRequest) -> ServiceResult<String> {
        if request.username.is_empty() || request.password.is_empty() {
            return Err(ServiceError::invalid("username and password are required"));
        }

        let Some(user) = self.store.get_user_by_username(&request.username)? else {
            tracing::debug!("Login for unknown user {}", request.username);
            return Err(ServiceError::InvalidCredentials);
        };

        if !self.passwords.verify(&request.password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "Login with wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(self.credentials.issue(&user)?)
    }

    pub fn get(&self, id: i64, principal: &Principal) -> ServiceResult<User> {
        authorize_fetched(self.store.get_user(id), id, principal)
    }

    pub fn update(&self, id: i64, patch: UserPatch, principal: &Principal) -> ServiceResult<User> {
        let mut user = self.get(id, principal)?;

        if let Some(username) = non_empty(patch.username) {
            if username != user.username {
                validate_username(&username)?;
                if self.store.get_user_by_username(&username)?.is_some() {
                    return Err(ServiceError::invalid("username already exists"));
                }
                user.username = username;
            }
        }
        if let Some(name) = non_empty(patch.name) {
            user.name = name;
        }
        if let Some(email) = non_empty(patch.email) {
            validate_email(&email)?;
            user.email = email;
        }
        if let Some(contact) = non_empty(patch.contact) {
            user.contact = contact;
        }
        user.updated_at = Utc::now();

        self.store.update_user(&user).map_err(duplicate_account)?;
        Ok(user)
    }

    pub fn delete(&self, id: i64, principal: &Principal) -> ServiceResult<()> {
        let user = self.get(id, principal)?;
        self.store.delete_user(user.id)?;
        tracing::info!(user_id = user.id, "Deleted user {}", user.username);
        Ok(())
    }

    pub fn create_account(&self, account: NewAccount, principal: &Principal) -> ServiceResult<User> {
        authorize(RouteClass::AdminOnly, principal)?;
        self.register(account.details, account.role)
    }

    /// Lists users after `cursor`, ordered by id.
    pub fn list(&self, principal: &Principal, cursor: i64, limit: i32) -> ServiceResult<Vec<User>> {
        authorize(RouteClass::AdminOnly, principal)?;
        Ok(self.store.list_users(cursor, limit)?)
    }
}
