use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved translation as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRecord {
    pub id: String,
    pub user_id: String,
    pub original_file: String,
    pub translated_file: String,
    pub media_type: Option<String>,
    pub original_language: Option<String>,
    pub target_language: String,
    pub original_transcript: Option<String>,
    pub english_translation: Option<String>,
    pub final_translation: Option<String>,
    pub translation_time: Option<f64>,
    pub accuracy: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/translations`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTranslation {
    pub original_file: Option<String>,
    pub translated_file: Option<String>,
    pub media_type: Option<String>,
    pub original_language: Option<String>,
    pub target_language: Option<String>,
    pub original_transcript: Option<String>,
    pub english_translation: Option<String>,
    pub final_translation: Option<String>,
    pub translation_time: Option<f64>,
    pub accuracy: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct TranslationList {
    pub translations: Vec<TranslationRecord>,
    pub total: u64,
}
