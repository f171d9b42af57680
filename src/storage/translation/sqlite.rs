use async_trait::async_trait;
use anyhow::Result;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use super::entity::{ActiveModel, Column, Entity, Model as TranslationModel};
use super::TranslationStorage;
use crate::web::Pagination;

pub struct SqliteTranslationStorage {
    db: DatabaseConnection,
}

impl SqliteTranslationStorage {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TranslationStorage for SqliteTranslationStorage {
    async fn create(&self, model: &TranslationModel) -> Result<()> {
        let active = ActiveModel {
            id: Set(model.id.clone()),
            user_id: Set(model.user_id.clone()),
            original_file: Set(model.original_file.clone()),
            translated_file: Set(model.translated_file.clone()),
            media_type: Set(model.media_type.clone()),
            original_language: Set(model.original_language.clone()),
            target_language: Set(model.target_language.clone()),
            original_transcript: Set(model.original_transcript.clone()),
            english_translation: Set(model.english_translation.clone()),
            final_translation: Set(model.final_translation.clone()),
            translation_time: Set(model.translation_time),
            accuracy: Set(model.accuracy),
            created_at: Set(model.created_at),
        };
        Entity::insert(active).exec(&self.db).await?;
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str, pagination: &Pagination) -> Result<Vec<TranslationModel>> {
        let pagination = pagination.check();
        Ok(Entity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::CreatedAt)
            .offset(pagination.offset())
            .limit(pagination.limit())
            .all(&self.db)
            .await?)
    }

    async fn count_by_user(&self, user_id: &str) -> Result<u64> {
        Ok(Entity::find()
            .filter(Column::UserId.eq(user_id))
            .count(&self.db)
            .await?)
    }
}
