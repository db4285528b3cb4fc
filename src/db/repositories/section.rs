use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{prelude::*, sections};

pub struct NewSection {
    pub title: String,
    pub content: Option<String>,
    pub section_order: i32,
    pub ebook_id: i32,
}

pub struct SectionRepository {
    conn: DatabaseConnection,
}

impl SectionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, section: NewSection) -> Result<sections::Model> {
        let active = sections::ActiveModel {
            title: Set(section.title),
            content: Set(section.content),
            section_order: Set(section.section_order),
            ebook_id: Set(section.ebook_id),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert section")?;

        Ok(model)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<sections::Model>> {
        let section = Sections::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query section by ID")?;

        Ok(section)
    }

    pub async fn list(&self) -> Result<Vec<sections::Model>> {
        let all = Sections::find()
            .all(&self.conn)
            .await
            .context("Failed to list sections")?;

        Ok(all)
    }

    /// Ascending by `section_order`; ties resolve by id so the order is
    /// stable across calls.
    pub async fn list_by_ebook(&self, ebook_id: i32) -> Result<Vec<sections::Model>> {
        let found = Sections::find()
            .filter(sections::Column::EbookId.eq(ebook_id))
            .order_by_asc(sections::Column::SectionOrder)
            .order_by_asc(sections::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query sections by ebook")?;

        Ok(found)
    }

    /// Replaces title, content and order wholesale. Returns `None` when the
    /// id does not resolve.
    pub async fn update(
        &self,
        id: i32,
        title: String,
        content: Option<String>,
        section_order: i32,
    ) -> Result<Option<sections::Model>> {
        let Some(section) = Sections::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: sections::ActiveModel = section.into();
        active.title = Set(title);
        active.content = Set(content);
        active.section_order = Set(section_order);

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update section")?;

        Ok(Some(updated))
    }

    /// Returns `false` when the id does not resolve.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Sections::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete section")?;

        Ok(result.rows_affected > 0)
    }

    /// Bulk removal; deleting zero rows is not an error.
    pub async fn delete_by_ebook(&self, ebook_id: i32) -> Result<u64> {
        let result = Sections::delete_many()
            .filter(sections::Column::EbookId.eq(ebook_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete sections by ebook")?;

        Ok(result.rows_affected)
    }
}
