use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::{CurrentUser, ensure_owner_or_admin};
use super::{ApiError, AppState, MessageBody};
use crate::services::user_service::UpdateUser;
use crate::services::{EbookRecord, UserRecord};

/// GET /api/users
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserRecord>>, ApiError> {
    let users = state.users.list().await?;
    Ok(Json(users))
}

/// GET /api/users/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<UserRecord>, ApiError> {
    let user = state
        .users
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;
    Ok(Json(user))
}

/// GET /api/users/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<UserRecord>, ApiError> {
    let user = state
        .users
        .get(current.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", current.id))?;
    Ok(Json(user))
}

/// GET /api/users/{id}/ebooks
pub async fn ebooks(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<EbookRecord>>, ApiError> {
    let ebooks = state.ebooks.list_by_user(id).await?;
    Ok(Json(ebooks))
}

/// PUT /api/users/{id} — the account owner or an admin.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUser>,
) -> Result<Json<UserRecord>, ApiError> {
    ensure_owner_or_admin(&current, id)?;

    let user = state.users.update(id, payload).await?;
    Ok(Json(user))
}

/// DELETE /api/users/{id} — the account owner or an admin. Cascades to the
/// user's ebooks and their sections.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<MessageBody>, ApiError> {
    ensure_owner_or_admin(&current, id)?;

    state.users.delete(id).await?;
    Ok(Json(MessageBody::new("User deleted successfully")))
}
