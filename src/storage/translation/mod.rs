use async_trait::async_trait;
use anyhow::Result;
use crate::storage::translation::entity::Model as TranslationModel;
use crate::web::Pagination;
pub mod sqlite;
pub mod entity;
pub mod mapping;

#[async_trait]
pub trait TranslationStorage: Send + Sync + 'static {
    async fn create(&self, model: &TranslationModel) -> Result<()>;
    async fn list_by_user(&self, user_id: &str, pagination: &Pagination) -> Result<Vec<TranslationModel>>;
    async fn count_by_user(&self, user_id: &str) -> Result<u64>;
}
