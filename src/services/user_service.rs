//! Domain service for user registration, authentication and account CRUD.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::users::{self, Role};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User {0} not found")]
    NotFound(i32),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// User view returned to callers; the password digest never leaves the
/// persistence layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
}

impl From<users::Model> for UserRecord {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            role: model.role,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterUser {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Partial profile update; absent fields keep their stored value. A new
/// password is re-hashed before persisting.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Registers a new account with role USER.
    ///
    /// # Errors
    ///
    /// [`UserError::DuplicateUsername`] / [`UserError::DuplicateEmail`] when
    /// either is already taken.
    async fn register(&self, request: RegisterUser) -> Result<UserRecord, UserError>;

    /// Verifies a username/password pair.
    ///
    /// # Errors
    ///
    /// [`UserError::InvalidCredentials`] when the username is unknown or the
    /// password does not verify.
    async fn authenticate(&self, username: &str, password: &str) -> Result<UserRecord, UserError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, UserError>;

    async fn get(&self, id: i32) -> Result<Option<UserRecord>, UserError>;

    async fn list(&self) -> Result<Vec<UserRecord>, UserError>;

    async fn update(&self, id: i32, changes: UpdateUser) -> Result<UserRecord, UserError>;

    /// Deletes the account; owned ebooks and their sections are removed with
    /// it, stored files best-effort.
    async fn delete(&self, id: i32) -> Result<(), UserError>;
}
