use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    routing::get,
    Extension, Json, Router,
};

use crate::auth::{require_auth, AuthUser};
use crate::history::{HistoryError, NewTranslation, TranslationList, TranslationRecord};
use crate::web::Pagination;
use crate::AppContext;

pub fn translations_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(list_translations).post(save_translation))
        .route_layer(middleware::from_fn_with_state(ctx.auth.clone(), require_auth))
        .with_state(ctx)
}

async fn save_translation(
    State(ctx): State<Arc<AppContext>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<NewTranslation>,
) -> Result<(StatusCode, Json<TranslationRecord>), HistoryError> {
    let record = ctx.history.save(&user.id, req).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_translations(
    State(ctx): State<Arc<AppContext>>,
    Extension(user): Extension<AuthUser>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<TranslationList>, HistoryError> {
    Ok(Json(ctx.history.list(&user.id, &pagination).await?))
}
