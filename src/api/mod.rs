use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    EbookService, SeaOrmEbookService, SeaOrmSectionService, SeaOrmUserService, SectionService,
    TokenService, UserService, bootstrap_admin,
};
use crate::storage::FileStore;

pub mod auth;
pub mod ebooks;
mod error;
pub mod sections;
mod types;
pub mod users;

pub use error::ApiError;
pub use types::MessageBody;

pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub tokens: TokenService,

    pub users: Arc<dyn UserService>,

    pub ebooks: Arc<dyn EbookService>,

    pub sections: Arc<dyn SectionService>,
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.storage.database_url,
        config.storage.max_db_connections,
        config.storage.min_db_connections,
    )
    .await?;

    bootstrap_admin(&store).await?;

    let files = FileStore::new(&config.storage.upload_dir)?;

    let tokens = TokenService::new(&config.security.jwt_secret, config.security.token_ttl_hours);

    let users: Arc<dyn UserService> =
        Arc::new(SeaOrmUserService::new(store.clone(), files.clone()));
    let ebooks: Arc<dyn EbookService> =
        Arc::new(SeaOrmEbookService::new(store.clone(), files.clone()));
    let sections: Arc<dyn SectionService> = Arc::new(SeaOrmSectionService::new(store.clone()));

    Ok(Arc::new(AppState {
        config,
        store,
        tokens,
        users,
        ebooks,
        sections,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/ebooks", get(ebooks::list))
        .route("/ebooks", post(ebooks::create))
        .route("/ebooks/search", get(ebooks::search))
        .route("/ebooks/my-ebooks", get(ebooks::my_ebooks))
        .route("/ebooks/category/{category}", get(ebooks::by_category))
        .route("/ebooks/user/{userId}", get(ebooks::by_user))
        .route("/ebooks/{id}", get(ebooks::get))
        .route("/ebooks/{id}", put(ebooks::update))
        .route("/ebooks/{id}", delete(ebooks::delete))
        .route("/ebooks/{id}/download", get(ebooks::download))
        .route("/sections", get(sections::list))
        .route("/sections", post(sections::create))
        .route("/sections/{id}", get(sections::get))
        .route("/sections/{id}", put(sections::update))
        .route("/sections/{id}", delete(sections::delete))
        .route("/sections/ebook/{ebookId}", get(sections::by_ebook))
        .route("/sections/ebook/{ebookId}", delete(sections::delete_by_ebook))
        .route("/users", get(users::list))
        .route("/users/me", get(users::me))
        .route("/users/{id}", get(users::get))
        .route("/users/{id}", put(users::update))
        .route("/users/{id}", delete(users::delete))
        .route("/users/{id}/ebooks", get(users::ebooks))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
