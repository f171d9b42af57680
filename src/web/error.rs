use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::history::HistoryError;
use crate::media::MediaError;
use crate::pipeline::PipelineError;
use crate::relay::RelayError;
use crate::utils::http::ErrorResponse;

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            RelayError::NoFileProvided =>
                (StatusCode::BAD_REQUEST, ErrorResponse::new("No file uploaded")),
            RelayError::UnsupportedLanguage(code) =>
                (StatusCode::BAD_REQUEST, ErrorResponse::new(format!("Unsupported target language: {}", code))),
            RelayError::Multipart(details) =>
                (StatusCode::BAD_REQUEST, ErrorResponse::with_details("Invalid multipart request", details)),
            RelayError::RateLimited =>
                (StatusCode::TOO_MANY_REQUESTS, ErrorResponse::new("Too many uploads, try again later")),
            RelayError::ShuttingDown =>
                (StatusCode::SERVICE_UNAVAILABLE, ErrorResponse::new("Server is shutting down")),
            RelayError::Media(e) => return e.into_response(),
            RelayError::Pipeline(e) => return e.into_response(),
        };
        body.into_response_with(status)
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        error!("Translation error: {}", self);
        let (status, body) = match self {
            PipelineError::Spawn(e) =>
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::with_details("Failed to start translation process", e.to_string())),
            PipelineError::Io(e) =>
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::with_details("Translation failed", e.to_string())),
            PipelineError::ExternalProcessFailed { stderr, .. } =>
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::with_details("Translation failed", stderr)),
            PipelineError::NoResultFound =>
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new("Failed to parse translation result")),
            PipelineError::MalformedResult(details) =>
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::with_details("Failed to process translation result", details)),
            PipelineError::Timeout(limit) =>
                (StatusCode::GATEWAY_TIMEOUT, ErrorResponse::with_details("Translation timed out", format!("no result after {}s", limit.as_secs()))),
        };
        body.into_response_with(status)
    }
}

impl IntoResponse for MediaError {
    fn into_response(self) -> Response {
        match self {
            MediaError::FileNotFound(_) =>
                ErrorResponse::new("File not found").into_response_with(StatusCode::NOT_FOUND),
            other => {
                error!("Media store error: {}", other);
                ErrorResponse::with_details("Failed to store upload", other.to_string())
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl IntoResponse for HistoryError {
    fn into_response(self) -> Response {
        match self {
            HistoryError::MissingFields =>
                ErrorResponse::new("originalFile, translatedFile and targetLanguage are required")
                    .into_response_with(StatusCode::BAD_REQUEST),
            HistoryError::Storage(e) => {
                error!("History storage error: {:#}", e);
                ErrorResponse::with_details("Server error", e.to_string())
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
