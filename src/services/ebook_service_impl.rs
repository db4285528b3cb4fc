//! `SeaORM` implementation of the `EbookService` trait.

use async_trait::async_trait;
use tracing::warn;

use crate::db::{EbookMeta, NewEbook, Store};
use crate::services::ebook_service::{
    EbookDraft, EbookError, EbookRecord, EbookService, UploadedFile,
};
use crate::storage::FileStore;

const PDF_CONTENT_TYPE: &str = "application/pdf";

pub struct SeaOrmEbookService {
    store: Store,
    files: FileStore,
}

impl SeaOrmEbookService {
    #[must_use]
    pub const fn new(store: Store, files: FileStore) -> Self {
        Self { store, files }
    }

    /// Validates the declared content type and stores the bytes under a
    /// generated name, preserving the original extension.
    async fn store_upload(&self, file: UploadedFile) -> Result<String, EbookError> {
        if file.content_type != PDF_CONTENT_TYPE {
            return Err(EbookError::UnsupportedMediaType);
        }

        let extension = file
            .file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext.to_string()))
            .unwrap_or_else(|| "pdf".to_string());

        let stored_name = self
            .files
            .save(&file.bytes, &extension)
            .await
            .map_err(|e| EbookError::Storage(e.to_string()))?;

        Ok(stored_name)
    }

    fn meta_from(draft: EbookDraft) -> EbookMeta {
        EbookMeta {
            title: draft.title,
            author: draft.author,
            category: draft.category,
            description: draft.description,
        }
    }
}

#[async_trait]
impl EbookService for SeaOrmEbookService {
    async fn create(
        &self,
        draft: EbookDraft,
        owner_id: i32,
        file: Option<UploadedFile>,
    ) -> Result<EbookRecord, EbookError> {
        let file_path = match file {
            Some(file) => Some(self.store_upload(file).await?),
            None => None,
        };

        let ebook = self
            .store
            .ebooks()
            .create(NewEbook {
                meta: Self::meta_from(draft),
                file_path,
                user_id: owner_id,
            })
            .await?;

        Ok(ebook.into())
    }

    async fn update(
        &self,
        id: i32,
        draft: EbookDraft,
        file: Option<UploadedFile>,
    ) -> Result<EbookRecord, EbookError> {
        // Validate and store the replacement before touching the record so
        // a bad upload leaves the ebook unchanged.
        let new_file_path = match file {
            Some(file) => Some(self.store_upload(file).await?),
            None => None,
        };

        let (updated, superseded) = self
            .store
            .ebooks()
            .update(id, Self::meta_from(draft), new_file_path)
            .await?
            .ok_or(EbookError::NotFound(id))?;

        if let Some(stored_name) = superseded {
            if let Err(e) = self.files.delete(&stored_name).await {
                warn!("Failed to delete superseded file {stored_name}: {e}");
            }
        }

        Ok(updated.into())
    }

    async fn delete(&self, id: i32) -> Result<(), EbookError> {
        let deleted = self
            .store
            .ebooks()
            .delete(id)
            .await?
            .ok_or(EbookError::NotFound(id))?;

        if let Some(stored_name) = deleted.file_path {
            if let Err(e) = self.files.delete(&stored_name).await {
                warn!("Failed to delete stored file {stored_name}: {e}");
            }
        }

        Ok(())
    }

    async fn get(&self, id: i32) -> Result<Option<EbookRecord>, EbookError> {
        let ebook = self.store.ebooks().get_by_id(id).await?;
        Ok(ebook.map(EbookRecord::from))
    }

    async fn list(&self) -> Result<Vec<EbookRecord>, EbookError> {
        let ebooks = self.store.ebooks().list().await?;
        Ok(ebooks.into_iter().map(EbookRecord::from).collect())
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<EbookRecord>, EbookError> {
        let ebooks = self.store.ebooks().list_by_category(category).await?;
        Ok(ebooks.into_iter().map(EbookRecord::from).collect())
    }

    async fn list_by_user(&self, user_id: i32) -> Result<Vec<EbookRecord>, EbookError> {
        let ebooks = self.store.ebooks().list_by_user(user_id).await?;
        Ok(ebooks.into_iter().map(EbookRecord::from).collect())
    }

    async fn search(&self, keyword: &str) -> Result<Vec<EbookRecord>, EbookError> {
        let ebooks = self.store.ebooks().search(keyword).await?;
        Ok(ebooks.into_iter().map(EbookRecord::from).collect())
    }

    async fn get_file(&self, id: i32) -> Result<(EbookRecord, Vec<u8>), EbookError> {
        let ebook = self
            .store
            .ebooks()
            .get_by_id(id)
            .await?
            .ok_or(EbookError::NotFound(id))?;

        let stored_name = ebook.file_path.clone().ok_or(EbookError::NotFound(id))?;

        let bytes = self
            .files
            .read(&stored_name)
            .await
            .map_err(|e| EbookError::Storage(e.to_string()))?
            .ok_or(EbookError::NotFound(id))?;

        Ok((ebook.into(), bytes))
    }
}
