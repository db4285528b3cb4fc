//! Domain service for ebook sections (chapters).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::sections;

#[derive(Debug, Error)]
pub enum SectionError {
    #[error("Section {0} not found")]
    NotFound(i32),

    #[error("Ebook {0} not found")]
    EbookNotFound(i32),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for SectionError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for SectionError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRecord {
    pub id: i32,
    pub title: String,
    pub content: Option<String>,
    pub section_order: i32,
    pub ebook_id: i32,
}

impl From<sections::Model> for SectionRecord {
    fn from(model: sections::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            section_order: model.section_order,
            ebook_id: model.ebook_id,
        }
    }
}

/// Caller-supplied section body. The order value is taken as-is; no
/// uniqueness or contiguity is enforced.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDraft {
    pub title: String,
    pub content: Option<String>,
    #[serde(default)]
    pub section_order: i32,
}

#[async_trait::async_trait]
pub trait SectionService: Send + Sync {
    /// # Errors
    ///
    /// [`SectionError::EbookNotFound`] when the parent ebook id does not
    /// resolve.
    async fn create(&self, ebook_id: i32, draft: SectionDraft)
    -> Result<SectionRecord, SectionError>;

    /// Replaces title, content and order unconditionally.
    async fn update(&self, id: i32, draft: SectionDraft) -> Result<SectionRecord, SectionError>;

    async fn delete(&self, id: i32) -> Result<(), SectionError>;

    async fn get(&self, id: i32) -> Result<Option<SectionRecord>, SectionError>;

    async fn list(&self) -> Result<Vec<SectionRecord>, SectionError>;

    /// Ascending by `section_order`, stable for ties.
    async fn list_by_ebook(&self, ebook_id: i32) -> Result<Vec<SectionRecord>, SectionError>;

    /// Bulk removal of every section owned by the ebook; a no-op (not an
    /// error) when none exist. Returns the number removed.
    async fn delete_all_by_ebook(&self, ebook_id: i32) -> Result<u64, SectionError>;
}
