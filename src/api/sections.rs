use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{CurrentUser, ensure_owner_or_admin};
use super::{ApiError, AppState, MessageBody};
use crate::services::{SectionDraft, SectionRecord};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSectionRequest {
    pub title: String,
    pub content: Option<String>,
    #[serde(default)]
    pub section_order: i32,
    pub ebook_id: i32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSectionRequest {
    pub title: String,
    pub content: Option<String>,
    #[serde(default)]
    pub section_order: i32,
}

/// Resolves the owning user of an ebook, 404 when the ebook is missing.
async fn ebook_owner(state: &AppState, ebook_id: i32) -> Result<i32, ApiError> {
    let ebook = state
        .ebooks
        .get(ebook_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Ebook", ebook_id))?;
    Ok(ebook.user_id)
}

/// GET /api/sections
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SectionRecord>>, ApiError> {
    let sections = state.sections.list().await?;
    Ok(Json(sections))
}

/// GET /api/sections/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<SectionRecord>, ApiError> {
    let section = state
        .sections
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Section", id))?;
    Ok(Json(section))
}

/// GET /api/sections/ebook/{ebookId} — sorted ascending by order.
pub async fn by_ebook(
    State(state): State<Arc<AppState>>,
    Path(ebook_id): Path<i32>,
) -> Result<Json<Vec<SectionRecord>>, ApiError> {
    let sections = state.sections.list_by_ebook(ebook_id).await?;
    Ok(Json(sections))
}

/// POST /api/sections — owner of the parent ebook or admin.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateSectionRequest>,
) -> Result<(StatusCode, Json<SectionRecord>), ApiError> {
    let owner = ebook_owner(&state, payload.ebook_id).await?;
    ensure_owner_or_admin(&user, owner)?;

    let section = state
        .sections
        .create(
            payload.ebook_id,
            SectionDraft {
                title: payload.title,
                content: payload.content,
                section_order: payload.section_order,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(section)))
}

/// PUT /api/sections/{id} — owner of the parent ebook or admin.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateSectionRequest>,
) -> Result<Json<SectionRecord>, ApiError> {
    let existing = state
        .sections
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Section", id))?;
    let owner = ebook_owner(&state, existing.ebook_id).await?;
    ensure_owner_or_admin(&user, owner)?;

    let section = state
        .sections
        .update(
            id,
            SectionDraft {
                title: payload.title,
                content: payload.content,
                section_order: payload.section_order,
            },
        )
        .await?;

    Ok(Json(section))
}

/// DELETE /api/sections/{id} — owner of the parent ebook or admin.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<MessageBody>, ApiError> {
    let existing = state
        .sections
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Section", id))?;
    let owner = ebook_owner(&state, existing.ebook_id).await?;
    ensure_owner_or_admin(&user, owner)?;

    state.sections.delete(id).await?;
    Ok(Json(MessageBody::new("Section deleted successfully")))
}

/// DELETE /api/sections/ebook/{ebookId} — bulk removal, no-op when the
/// ebook has no sections.
pub async fn delete_by_ebook(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(ebook_id): Path<i32>,
) -> Result<Json<MessageBody>, ApiError> {
    let owner = ebook_owner(&state, ebook_id).await?;
    ensure_owner_or_admin(&user, owner)?;

    state.sections.delete_all_by_ebook(ebook_id).await?;
    Ok(Json(MessageBody::new("All sections deleted successfully")))
}
