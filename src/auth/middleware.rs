use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::error;

use super::{Auth, AuthError};
use crate::utils::http::ErrorResponse;

/// Rejects requests without a valid bearer token and hands the resolved
/// `AuthUser` to the handler through request extensions.
pub async fn require_auth(
    State(auth): State<Arc<Auth>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let user = auth.authenticate(header).await?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::MissingFields | AuthError::IdentityTaken =>
                StatusCode::BAD_REQUEST,
            AuthError::EmailTaken | AuthError::UsernameTaken =>
                StatusCode::CONFLICT,
            AuthError::InvalidCredentials
            | AuthError::Unauthenticated
            | AuthError::InvalidToken
            | AuthError::TokenExpired =>
                StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound =>
                StatusCode::NOT_FOUND,
            AuthError::StorageError(_) | AuthError::Internal(_) =>
                StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            AuthError::StorageError(details) | AuthError::Internal(details) => {
                error!("Auth failure: {}", details);
                ErrorResponse::with_details("Server error", details.clone())
            }
            other => ErrorResponse::new(other.to_string()),
        };

        body.into_response_with(status)
    }
}
