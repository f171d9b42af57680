use crate::history::types::TranslationRecord;
use crate::storage::translation::entity::Model as TranslationModel;

impl From<TranslationModel> for TranslationRecord {
    fn from(model: TranslationModel) -> Self {
        TranslationRecord {
            id: model.id,
            user_id: model.user_id,
            original_file: model.original_file,
            translated_file: model.translated_file,
            media_type: model.media_type,
            original_language: model.original_language,
            target_language: model.target_language,
            original_transcript: model.original_transcript,
            english_translation: model.english_translation,
            final_translation: model.final_translation,
            translation_time: model.translation_time,
            accuracy: model.accuracy,
            created_at: model.created_at,
        }
    }
}
