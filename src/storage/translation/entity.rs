use sea_orm::entity::prelude::*;
use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "translations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub original_file: String,
    pub translated_file: String,
    pub media_type: Option<String>,  // "audio" | "video"
    pub original_language: Option<String>,
    pub target_language: String,
    pub original_transcript: Option<String>,
    pub english_translation: Option<String>,
    pub final_translation: Option<String>,
    pub translation_time: Option<f64>,
    pub accuracy: Option<f64>,  // overall accuracy reported by the script
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
