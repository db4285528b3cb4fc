//! Domain service for ebook metadata and the associated PDF assets.

use serde::Serialize;
use thiserror::Error;

use crate::entities::ebooks;

#[derive(Debug, Error)]
pub enum EbookError {
    #[error("Ebook {0} not found")]
    NotFound(i32),

    #[error("Only PDF files are allowed")]
    UnsupportedMediaType,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for EbookError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for EbookError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EbookRecord {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub category: String,
    pub description: Option<String>,
    pub file_path: Option<String>,
    pub upload_date: String,
    pub user_id: i32,
}

impl From<ebooks::Model> for EbookRecord {
    fn from(model: ebooks::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            author: model.author,
            category: model.category,
            description: model.description,
            file_path: model.file_path,
            upload_date: model.upload_date,
            user_id: model.user_id,
        }
    }
}

/// Metadata supplied by the caller; applied wholesale on create and update.
#[derive(Debug)]
pub struct EbookDraft {
    pub title: String,
    pub author: String,
    pub category: String,
    pub description: Option<String>,
}

/// An uploaded binary as received from the multipart form. The declared
/// content type is validated, the original file name only contributes its
/// extension.
#[derive(Debug)]
pub struct UploadedFile {
    pub content_type: String,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

#[async_trait::async_trait]
pub trait EbookService: Send + Sync {
    /// Creates an ebook owned by `owner_id`, storing the optional file under
    /// a freshly generated opaque name.
    ///
    /// # Errors
    ///
    /// [`EbookError::UnsupportedMediaType`] when a file is supplied with a
    /// content type other than `application/pdf`.
    async fn create(
        &self,
        draft: EbookDraft,
        owner_id: i32,
        file: Option<UploadedFile>,
    ) -> Result<EbookRecord, EbookError>;

    /// Replaces metadata unconditionally; a supplied file is validated and
    /// stored like on create, and the superseded stored file is removed
    /// best-effort.
    async fn update(
        &self,
        id: i32,
        draft: EbookDraft,
        file: Option<UploadedFile>,
    ) -> Result<EbookRecord, EbookError>;

    /// Deletes the record and its sections; the stored file is removed
    /// best-effort (a failure is logged, never propagated).
    async fn delete(&self, id: i32) -> Result<(), EbookError>;

    async fn get(&self, id: i32) -> Result<Option<EbookRecord>, EbookError>;

    async fn list(&self) -> Result<Vec<EbookRecord>, EbookError>;

    async fn list_by_category(&self, category: &str) -> Result<Vec<EbookRecord>, EbookError>;

    async fn list_by_user(&self, user_id: i32) -> Result<Vec<EbookRecord>, EbookError>;

    /// Case-insensitive substring search over title, author, category and
    /// description.
    async fn search(&self, keyword: &str) -> Result<Vec<EbookRecord>, EbookError>;

    /// Returns the record and the stored file bytes.
    ///
    /// # Errors
    ///
    /// [`EbookError::NotFound`] when the ebook, its file path, or the blob
    /// itself is missing.
    async fn get_file(&self, id: i32) -> Result<(EbookRecord, Vec<u8>), EbookError>;
}
