use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};

use crate::auth::{Auth, AuthError, AuthSession, LoginRequest, RegisterRequest};

pub fn auth_router(auth: Arc<Auth>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(auth)
}

async fn register(
    State(auth): State<Arc<Auth>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthSession>), AuthError> {
    let session = auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn login(
    State(auth): State<Arc<Auth>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthSession>, AuthError> {
    Ok(Json(auth.login(req).await?))
}
