pub mod auth;
pub mod config;
pub mod history;
pub mod languages;
pub mod media;
pub mod pipeline;
pub mod relay;
pub mod storage;
pub mod utils;
pub mod web;

use std::sync::Arc;

use anyhow::Result;
use auth::Auth;
use config::AppConfig;
use history::TranslationHistory;
use media::MediaStore;
use pipeline::TranslationPipeline;
use relay::TranslationRelay;
use storage::{SqliteTranslationStorage, SqliteUserStorage};

pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub auth: Arc<Auth>,
    pub relay: Arc<TranslationRelay>,
    pub history: Arc<TranslationHistory>,
}

impl AppContext {
    /// Opens the database, prepares the media directories and wires the
    /// services around the given pipeline.
    pub async fn build(config: AppConfig, pipeline: Arc<dyn TranslationPipeline>) -> Result<Self> {
        let db = storage::connect(&config.database_url).await?;

        let auth = Auth::new(
            Arc::new(SqliteUserStorage::new(db.clone())),
            &config.jwt_secret,
            config.jwt_ttl,
        );
        let history = TranslationHistory::new(Arc::new(SqliteTranslationStorage::new(db)));

        let media = MediaStore::new(config.upload_dir.clone(), config.output_dir.clone());
        media.ensure_dirs().await?;
        let relay = TranslationRelay::new(
            pipeline,
            media,
            config.max_concurrent_jobs,
            config.upload_rate_per_minute,
        );

        Ok(Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            relay: Arc::new(relay),
            history: Arc::new(history),
        })
    }
}
