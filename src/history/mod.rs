pub mod types;

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::pipeline::TranslationResult;
use crate::relay::UploadRequest;
use crate::storage::translation::entity::Model as TranslationModel;
use crate::storage::TranslationStorage;
use crate::web::Pagination;

pub use types::{NewTranslation, TranslationList, TranslationRecord};

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("originalFile, translatedFile and targetLanguage are required")]
    MissingFields,

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Per-user translation history.
pub struct TranslationHistory {
    storage: Arc<dyn TranslationStorage>,
}

impl TranslationHistory {
    pub fn new(storage: Arc<dyn TranslationStorage>) -> Self {
        Self { storage }
    }

    pub async fn save(&self, user_id: &str, req: NewTranslation) -> Result<TranslationRecord, HistoryError> {
        let (original_file, translated_file, target_language) =
            match (req.original_file, req.translated_file, req.target_language) {
                (Some(o), Some(t), Some(l)) if !o.is_empty() && !t.is_empty() && !l.is_empty() => (o, t, l),
                _ => return Err(HistoryError::MissingFields),
            };

        let model = TranslationModel {
            id: format!("tr-{}", Uuid::new_v4()),
            user_id: user_id.to_string(),
            original_file,
            translated_file,
            media_type: req.media_type,
            original_language: req.original_language,
            target_language,
            original_transcript: req.original_transcript,
            english_translation: req.english_translation,
            final_translation: req.final_translation,
            translation_time: req.translation_time,
            accuracy: req.accuracy,
            created_at: Utc::now(),
        };

        self.storage.create(&model).await?;
        info!("Saved translation {} for user {}", model.id, user_id);
        Ok(model.into())
    }

    /// Records a finished upload. Returns `None` when the script did not
    /// report success or named no output file.
    pub async fn record_upload(
        &self,
        user_id: &str,
        upload: &UploadRequest,
        result: &TranslationResult,
    ) -> Result<Option<TranslationRecord>, HistoryError> {
        let translated_file = match result.output_file() {
            Some(file) if result.success() => file.to_string(),
            _ => return Ok(None),
        };

        let req = NewTranslation {
            original_file: Some(
                upload
                    .original_name
                    .clone()
                    .unwrap_or_else(|| upload.stored.name.clone()),
            ),
            translated_file: Some(translated_file),
            media_type: Some(if result.is_video() { "video" } else { "audio" }.to_string()),
            original_language: None,
            target_language: Some(upload.target_lang.clone()),
            original_transcript: result.original_transcript().map(str::to_string),
            english_translation: result.english_translation().map(str::to_string),
            final_translation: result.final_translation().map(str::to_string),
            translation_time: result.translation_time(),
            accuracy: result.overall_accuracy(),
        };

        self.save(user_id, req).await.map(Some)
    }

    pub async fn list(&self, user_id: &str, pagination: &Pagination) -> Result<TranslationList, HistoryError> {
        let models = self.storage.list_by_user(user_id, pagination).await?;
        let total = self.storage.count_by_user(user_id).await?;

        Ok(TranslationList {
            translations: models.into_iter().map(TranslationRecord::from).collect(),
            total,
        })
    }
}
