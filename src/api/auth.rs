use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::entities::users::Role;
use crate::services::user_service::RegisterUser;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub username: String,
    pub user_id: i32,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: Role,
    pub user_id: i32,
}

// ============================================================================
// Middleware
// ============================================================================

/// The authenticated caller, resolved once per request by the middleware
/// and threaded explicitly to handlers via request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Returns 403 unless the caller owns the resource or is an admin.
pub fn ensure_owner_or_admin(user: &CurrentUser, owner_id: i32) -> Result<(), ApiError> {
    if user.is_admin() || user.id == owner_id {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "You do not have permission to modify this resource",
        ))
    }
}

/// Bearer-token authentication: verifies the JWT, resolves its subject to a
/// user row and attaches a [`CurrentUser`] to the request. Everything else
/// is rejected with 401 before any handler runs.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return unauthorized("Missing bearer token");
    };

    let Ok(username) = state.tokens.verify(&token) else {
        return unauthorized("Invalid or expired token");
    };

    let user = match state.store.users().get_by_username(&username).await {
        Ok(Some(user)) => user,
        Ok(None) => return unauthorized("Unknown user"),
        Err(e) => {
            return ApiError::DatabaseError(e.to_string()).into_response();
        }
    };

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
        role: user.role,
    });

    next.run(request).await
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get("Authorization")?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;
    Some(token.trim().to_string())
}

fn unauthorized(msg: &str) -> Response {
    ApiError::Unauthorized(msg.to_string()).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user = state
        .users
        .register(RegisterUser {
            username: payload.username,
            password: payload.password,
            email: payload.email,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            username: user.username,
            user_id: user.id,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let user = state
        .users
        .authenticate(&payload.username, &payload.password)
        .await?;

    let token = state
        .tokens
        .issue(&user.username)
        .map_err(|e| ApiError::internal(format!("Failed to issue token: {e}")))?;

    Ok(Json(LoginResponse {
        token,
        username: user.username,
        role: user.role,
        user_id: user.id,
    }))
}
