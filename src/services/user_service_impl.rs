//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use tokio::task;
use tracing::{info, warn};

use crate::db::{NewUser, Store, UserUpdate};
use crate::entities::users::Role;
use crate::services::password::{hash_password, verify_password};
use crate::services::user_service::{
    RegisterUser, UpdateUser, UserError, UserRecord, UserService,
};
use crate::storage::FileStore;

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin123";
const ADMIN_EMAIL: &str = "admin@ebook.local";

/// Creates the well-known admin account on first start. Idempotent: a
/// second start finds the account and does nothing.
pub async fn bootstrap_admin(store: &Store) -> anyhow::Result<()> {
    if store.users().exists_by_username(ADMIN_USERNAME).await? {
        info!("Admin user already exists, skipping bootstrap");
        return Ok(());
    }

    let password_hash = task::spawn_blocking(|| hash_password(ADMIN_PASSWORD))
        .await
        .map_err(|e| anyhow::anyhow!("Password hashing task panicked: {e}"))??;

    store
        .users()
        .create(NewUser {
            username: ADMIN_USERNAME.to_string(),
            email: ADMIN_EMAIL.to_string(),
            password_hash,
            role: Role::Admin,
        })
        .await?;

    info!("Bootstrapped default admin user '{ADMIN_USERNAME}'");
    Ok(())
}

pub struct SeaOrmUserService {
    store: Store,
    files: FileStore,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, files: FileStore) -> Self {
        Self { store, files }
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn register(&self, request: RegisterUser) -> Result<UserRecord, UserError> {
        if request.username.trim().is_empty() || request.password.is_empty() {
            return Err(UserError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let repo = self.store.users();

        if repo.exists_by_username(&request.username).await? {
            return Err(UserError::DuplicateUsername);
        }
        if repo.exists_by_email(&request.email).await? {
            return Err(UserError::DuplicateEmail);
        }

        let password = request.password;
        let password_hash = task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| UserError::Internal(format!("Password hashing task panicked: {e}")))??;

        let user = repo
            .create(NewUser {
                username: request.username,
                email: request.email,
                password_hash,
                role: Role::User,
            })
            .await?;

        Ok(user.into())
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<UserRecord, UserError> {
        let user = self
            .store
            .users()
            .get_by_username(username)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        let password = password.to_string();
        let digest = user.password_hash.clone();
        let is_valid = task::spawn_blocking(move || verify_password(&password, &digest))
            .await
            .map_err(|e| UserError::Internal(format!("Verification task panicked: {e}")))?;

        if !is_valid {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user.into())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, UserError> {
        let user = self.store.users().get_by_username(username).await?;
        Ok(user.map(UserRecord::from))
    }

    async fn get(&self, id: i32) -> Result<Option<UserRecord>, UserError> {
        let user = self.store.users().get_by_id(id).await?;
        Ok(user.map(UserRecord::from))
    }

    async fn list(&self) -> Result<Vec<UserRecord>, UserError> {
        let users = self.store.users().list().await?;
        Ok(users.into_iter().map(UserRecord::from).collect())
    }

    async fn update(&self, id: i32, changes: UpdateUser) -> Result<UserRecord, UserError> {
        let repo = self.store.users();

        if let Some(username) = &changes.username {
            let taken = repo.get_by_username(username).await?;
            if taken.is_some_and(|u| u.id != id) {
                return Err(UserError::DuplicateUsername);
            }
        }

        if let Some(email) = &changes.email {
            let taken = repo.get_by_email(email).await?;
            if taken.is_some_and(|u| u.id != id) {
                return Err(UserError::DuplicateEmail);
            }
        }

        let password_hash = match changes.password {
            Some(password) => Some(
                task::spawn_blocking(move || hash_password(&password))
                    .await
                    .map_err(|e| {
                        UserError::Internal(format!("Password hashing task panicked: {e}"))
                    })??,
            ),
            None => None,
        };

        let updated = repo
            .update(
                id,
                UserUpdate {
                    username: changes.username,
                    email: changes.email,
                    password_hash,
                    role: None,
                },
            )
            .await?
            .ok_or(UserError::NotFound(id))?;

        Ok(updated.into())
    }

    async fn delete(&self, id: i32) -> Result<(), UserError> {
        let file_paths = self
            .store
            .users()
            .delete(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        for stored_name in file_paths {
            if let Err(e) = self.files.delete(&stored_name).await {
                warn!("Failed to delete stored file {stored_name}: {e}");
            }
        }

        Ok(())
    }
}
