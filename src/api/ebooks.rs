use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{CurrentUser, ensure_owner_or_admin};
use super::{ApiError, AppState, MessageBody};
use crate::services::{EbookDraft, EbookRecord, UploadedFile};

#[derive(Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
}

const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Multipart form shared by create and update: `title`, `author`,
/// `category`, optional `description`, optional `file`.
struct EbookForm {
    draft: EbookDraft,
    file: Option<UploadedFile>,
}

async fn read_ebook_form(mut multipart: Multipart) -> Result<EbookForm, ApiError> {
    let mut title = None;
    let mut author = None;
    let mut category = None;
    let mut description = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        match name.as_str() {
            "title" => title = Some(read_text(field).await?),
            "author" => author = Some(read_text(field).await?),
            "category" => category = Some(read_text(field).await?),
            "description" => description = Some(read_text(field).await?),
            "file" => {
                let content_type = field
                    .content_type()
                    .ok_or_else(|| ApiError::validation("File part is missing a content type"))?
                    .to_string();
                let file_name = field.file_name().map(ToString::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("Failed to read file part: {e}")))?;

                // An empty file part (no selection in the form) counts as no file.
                if !bytes.is_empty() {
                    file = Some(UploadedFile {
                        content_type,
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    if let Some(description) = &description {
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(ApiError::validation(format!(
                "Description must be at most {MAX_DESCRIPTION_CHARS} characters"
            )));
        }
    }

    let draft = EbookDraft {
        title: require_field(title, "title")?,
        author: require_field(author, "author")?,
        category: require_field(category, "category")?,
        description,
    };

    Ok(EbookForm { draft, file })
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::validation(format!("Failed to read form field: {e}")))
}

fn require_field(value: Option<String>, name: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::validation(format!("{name} is required"))),
    }
}

/// GET /api/ebooks
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EbookRecord>>, ApiError> {
    let ebooks = state.ebooks.list().await?;
    Ok(Json(ebooks))
}

/// GET /api/ebooks/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<EbookRecord>, ApiError> {
    let ebook = state
        .ebooks
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Ebook", id))?;
    Ok(Json(ebook))
}

/// GET /api/ebooks/search?keyword=
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<EbookRecord>>, ApiError> {
    let ebooks = state.ebooks.search(&query.keyword).await?;
    Ok(Json(ebooks))
}

/// GET /api/ebooks/category/{category}
pub async fn by_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<Vec<EbookRecord>>, ApiError> {
    let ebooks = state.ebooks.list_by_category(&category).await?;
    Ok(Json(ebooks))
}

/// GET /api/ebooks/user/{userId}
pub async fn by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<EbookRecord>>, ApiError> {
    let ebooks = state.ebooks.list_by_user(user_id).await?;
    Ok(Json(ebooks))
}

/// GET /api/ebooks/my-ebooks
pub async fn my_ebooks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<EbookRecord>>, ApiError> {
    let ebooks = state.ebooks.list_by_user(user.id).await?;
    Ok(Json(ebooks))
}

/// POST /api/ebooks — multipart form, owner is the authenticated caller.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<EbookRecord>), ApiError> {
    let form = read_ebook_form(multipart).await?;
    let ebook = state.ebooks.create(form.draft, user.id, form.file).await?;
    Ok((StatusCode::CREATED, Json(ebook)))
}

/// PUT /api/ebooks/{id} — owner or admin only.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<EbookRecord>, ApiError> {
    let existing = state
        .ebooks
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Ebook", id))?;
    ensure_owner_or_admin(&user, existing.user_id)?;

    let form = read_ebook_form(multipart).await?;
    let ebook = state.ebooks.update(id, form.draft, form.file).await?;
    Ok(Json(ebook))
}

/// DELETE /api/ebooks/{id} — admin only.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<MessageBody>, ApiError> {
    if !user.is_admin() {
        return Err(ApiError::forbidden("Only admins can delete ebooks"));
    }

    state.ebooks.delete(id).await?;
    Ok(Json(MessageBody::new("Ebook deleted successfully")))
}

/// GET /api/ebooks/{id}/download
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let (ebook, bytes) = state.ebooks.get_file(id).await?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.pdf\"", ebook.title),
        ),
    ];

    Ok((headers, bytes))
}
