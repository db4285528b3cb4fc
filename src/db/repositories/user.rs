use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::entities::users::Role;
use crate::entities::{ebooks, prelude::*, sections, users};

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Field-wise update; `None` leaves the stored value untouched.
#[derive(Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, user: NewUser) -> Result<users::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            username: Set(user.username),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            role: Set(user.role),
            created_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(model)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user)
    }

    pub async fn exists_by_username(&self, username: &str) -> Result<bool> {
        Ok(self.get_by_username(username).await?.is_some())
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user)
    }

    pub async fn exists_by_email(&self, email: &str) -> Result<bool> {
        Ok(self.get_by_email(email).await?.is_some())
    }

    pub async fn list(&self) -> Result<Vec<users::Model>> {
        let all = Users::find()
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(all)
    }

    /// Returns `None` when the id does not resolve.
    pub async fn update(&self, id: i32, changes: UserUpdate) -> Result<Option<users::Model>> {
        let Some(user) = Users::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(password_hash) = changes.password_hash {
            active.password_hash = Set(password_hash);
        }
        if let Some(role) = changes.role {
            active.role = Set(role);
        }

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update user")?;

        Ok(Some(updated))
    }

    /// Deletes the user together with its ebooks and their sections in one
    /// transaction. Returns the stored file names of the removed ebooks so
    /// the caller can clean up the file store, or `None` when the id does
    /// not resolve.
    pub async fn delete(&self, id: i32) -> Result<Option<Vec<String>>> {
        let txn = self.conn.begin().await?;

        let Some(user) = Users::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };

        let owned = Ebooks::find()
            .filter(ebooks::Column::UserId.eq(user.id))
            .all(&txn)
            .await?;

        let ebook_ids: Vec<i32> = owned.iter().map(|e| e.id).collect();
        let file_paths: Vec<String> = owned.iter().filter_map(|e| e.file_path.clone()).collect();

        if !ebook_ids.is_empty() {
            Sections::delete_many()
                .filter(sections::Column::EbookId.is_in(ebook_ids.clone()))
                .exec(&txn)
                .await?;

            Ebooks::delete_many()
                .filter(ebooks::Column::Id.is_in(ebook_ids))
                .exec(&txn)
                .await?;
        }

        Users::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(Some(file_paths))
    }
}
