//! `SeaORM` implementation of the `SectionService` trait.

use async_trait::async_trait;

use crate::db::{NewSection, Store};
use crate::services::section_service::{SectionDraft, SectionError, SectionRecord, SectionService};

pub struct SeaOrmSectionService {
    store: Store,
}

impl SeaOrmSectionService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SectionService for SeaOrmSectionService {
    async fn create(
        &self,
        ebook_id: i32,
        draft: SectionDraft,
    ) -> Result<SectionRecord, SectionError> {
        let parent = self
            .store
            .ebooks()
            .get_by_id(ebook_id)
            .await
            .map_err(SectionError::from)?;
        if parent.is_none() {
            return Err(SectionError::EbookNotFound(ebook_id));
        }

        let section = self
            .store
            .sections()
            .create(NewSection {
                title: draft.title,
                content: draft.content,
                section_order: draft.section_order,
                ebook_id,
            })
            .await?;

        Ok(section.into())
    }

    async fn update(&self, id: i32, draft: SectionDraft) -> Result<SectionRecord, SectionError> {
        let updated = self
            .store
            .sections()
            .update(id, draft.title, draft.content, draft.section_order)
            .await?
            .ok_or(SectionError::NotFound(id))?;

        Ok(updated.into())
    }

    async fn delete(&self, id: i32) -> Result<(), SectionError> {
        let deleted = self.store.sections().delete(id).await?;
        if !deleted {
            return Err(SectionError::NotFound(id));
        }
        Ok(())
    }

    async fn get(&self, id: i32) -> Result<Option<SectionRecord>, SectionError> {
        let section = self.store.sections().get_by_id(id).await?;
        Ok(section.map(SectionRecord::from))
    }

    async fn list(&self) -> Result<Vec<SectionRecord>, SectionError> {
        let sections = self.store.sections().list().await?;
        Ok(sections.into_iter().map(SectionRecord::from).collect())
    }

    async fn list_by_ebook(&self, ebook_id: i32) -> Result<Vec<SectionRecord>, SectionError> {
        let sections = self.store.sections().list_by_ebook(ebook_id).await?;
        Ok(sections.into_iter().map(SectionRecord::from).collect())
    }

    async fn delete_all_by_ebook(&self, ebook_id: i32) -> Result<u64, SectionError> {
        let removed = self.store.sections().delete_by_ebook(ebook_id).await?;
        Ok(removed)
    }
}
