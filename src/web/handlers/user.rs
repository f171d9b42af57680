use std::sync::Arc;

use axum::{
    extract::State,
    middleware,
    routing::get,
    Extension, Json, Router,
};

use crate::auth::{require_auth, Auth, AuthError, AuthUser, UpdateProfileRequest, UserProfile};

pub fn user_router(auth: Arc<Auth>) -> Router {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route_layer(middleware::from_fn_with_state(auth.clone(), require_auth))
        .with_state(auth)
}

async fn get_profile(
    State(auth): State<Arc<Auth>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>, AuthError> {
    Ok(Json(auth.profile(&user.id).await?))
}

async fn update_profile(
    State(auth): State<Arc<Auth>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AuthError> {
    Ok(Json(auth.update_profile(&user.id, req).await?))
}
