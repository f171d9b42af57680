use axum::{routing::get, Json, Router};
use serde_json::{json, Map, Value};

use crate::languages::{LANGUAGES, LANGUAGE_MAP};

pub fn system_router() -> Router {
    Router::new()
        .route("/languages", get(list_languages))
        .route("/health", get(health))
}

async fn list_languages() -> Json<Map<String, Value>> {
    Json(LANGUAGE_MAP.clone())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Translation server is running",
        "languages_available": LANGUAGES.len(),
        "version": env!("GIT_HASH"),
    }))
}
