use axum::{extract::DefaultBodyLimit, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::AppContext;

pub mod auth;
pub mod media;
pub mod system;
pub mod translations;
pub mod user;

pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .merge(system::system_router())
        .merge(media::media_router(ctx.clone()))
        .nest("/api/auth", auth::auth_router(ctx.auth.clone()))
        .nest("/api/user", user::user_router(ctx.auth.clone()))
        .nest("/api/translations", translations::translations_router(ctx.clone()))
        .layer(DefaultBodyLimit::max(ctx.config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
