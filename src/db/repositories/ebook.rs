use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::entities::{ebooks, prelude::*, sections};

pub struct NewEbook {
    pub meta: EbookMeta,
    pub file_path: Option<String>,
    pub user_id: i32,
}

/// Metadata fields replaced wholesale on update. Absent optional fields
/// clear the stored value.
pub struct EbookMeta {
    pub title: String,
    pub author: String,
    pub category: String,
    pub description: Option<String>,
}

pub struct EbookRepository {
    conn: DatabaseConnection,
}

impl EbookRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, ebook: NewEbook) -> Result<ebooks::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = ebooks::ActiveModel {
            title: Set(ebook.meta.title),
            author: Set(ebook.meta.author),
            category: Set(ebook.meta.category),
            description: Set(ebook.meta.description),
            file_path: Set(ebook.file_path),
            upload_date: Set(now),
            user_id: Set(ebook.user_id),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert ebook")?;

        Ok(model)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<ebooks::Model>> {
        let ebook = Ebooks::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query ebook by ID")?;

        Ok(ebook)
    }

    pub async fn list(&self) -> Result<Vec<ebooks::Model>> {
        let all = Ebooks::find()
            .all(&self.conn)
            .await
            .context("Failed to list ebooks")?;

        Ok(all)
    }

    pub async fn list_by_category(&self, category: &str) -> Result<Vec<ebooks::Model>> {
        let found = Ebooks::find()
            .filter(ebooks::Column::Category.eq(category))
            .all(&self.conn)
            .await
            .context("Failed to query ebooks by category")?;

        Ok(found)
    }

    pub async fn list_by_user(&self, user_id: i32) -> Result<Vec<ebooks::Model>> {
        let found = Ebooks::find()
            .filter(ebooks::Column::UserId.eq(user_id))
            .all(&self.conn)
            .await
            .context("Failed to query ebooks by user")?;

        Ok(found)
    }

    /// Case-insensitive substring match against title, author, category or
    /// description (logical OR). `%` and `_` in the keyword match literally.
    pub async fn search(&self, keyword: &str) -> Result<Vec<ebooks::Model>> {
        let escaped = keyword
            .to_lowercase()
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = || LikeExpr::new(format!("%{escaped}%")).escape('\\');

        let condition = Condition::any()
            .add(Expr::expr(Func::lower(Expr::col(ebooks::Column::Title))).like(pattern()))
            .add(Expr::expr(Func::lower(Expr::col(ebooks::Column::Author))).like(pattern()))
            .add(Expr::expr(Func::lower(Expr::col(ebooks::Column::Category))).like(pattern()))
            .add(Expr::expr(Func::lower(Expr::col(ebooks::Column::Description))).like(pattern()));

        let found = Ebooks::find()
            .filter(condition)
            .all(&self.conn)
            .await
            .context("Failed to search ebooks")?;

        Ok(found)
    }

    /// Replaces all metadata; the stored file name changes only when
    /// `new_file_path` is supplied. Returns the updated model together with
    /// the superseded file name (for cleanup), or `None` when the id does
    /// not resolve.
    pub async fn update(
        &self,
        id: i32,
        meta: EbookMeta,
        new_file_path: Option<String>,
    ) -> Result<Option<(ebooks::Model, Option<String>)>> {
        let Some(ebook) = Ebooks::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let previous_file = ebook.file_path.clone();
        let replacing_file = new_file_path.is_some();

        let mut active: ebooks::ActiveModel = ebook.into();
        active.title = Set(meta.title);
        active.author = Set(meta.author);
        active.category = Set(meta.category);
        active.description = Set(meta.description);
        if let Some(file_path) = new_file_path {
            active.file_path = Set(Some(file_path));
        }

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update ebook")?;

        let superseded = if replacing_file { previous_file } else { None };
        Ok(Some((updated, superseded)))
    }

    /// Deletes the ebook and its sections in one transaction. Returns the
    /// deleted model (the caller removes the stored file), or `None` when
    /// the id does not resolve.
    pub async fn delete(&self, id: i32) -> Result<Option<ebooks::Model>> {
        let txn = self.conn.begin().await?;

        let Some(ebook) = Ebooks::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };

        Sections::delete_many()
            .filter(sections::Column::EbookId.eq(ebook.id))
            .exec(&txn)
            .await?;

        Ebooks::delete_by_id(ebook.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(Some(ebook))
    }
}
