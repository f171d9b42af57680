use async_trait::async_trait;
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ActiveValue::{Set, Unchanged}, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, SqlErr,
};

use super::entity::{ActiveModel, Column, Entity, Model as UserModel};
use super::{UserConflict, UserStorage};

pub struct SqliteUserStorage {
    db: DatabaseConnection,
}

impl SqliteUserStorage {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStorage for SqliteUserStorage {
    async fn create(&self, model: &UserModel) -> Result<()> {
        let active = ActiveModel {
            id: Set(model.id.clone()),
            username: Set(model.username.clone()),
            email: Set(model.email.clone()),
            password_hash: Set(model.password_hash.clone()),
            created_at: Set(model.created_at),
        };
        Entity::insert(active).exec(&self.db).await.map_err(conflict_or_db)?;
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<Option<UserModel>> {
        Ok(Entity::find_by_id(user_id.to_string()).one(&self.db).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>> {
        Ok(Entity::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>> {
        Ok(Entity::find()
            .filter(Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    async fn update(&self, model: &UserModel) -> Result<()> {
        let active = ActiveModel {
            id: Unchanged(model.id.clone()),
            username: Set(model.username.clone()),
            email: Set(model.email.clone()),
            password_hash: Set(model.password_hash.clone()),
            created_at: Unchanged(model.created_at),
        };
        active.update(&self.db).await.map_err(conflict_or_db)?;
        Ok(())
    }
}

// SQLite reports e.g. "UNIQUE constraint failed: users.email"
fn conflict_or_db(err: DbErr) -> anyhow::Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) if msg.contains("email") => UserConflict::Email.into(),
        Some(SqlErr::UniqueConstraintViolation(msg)) if msg.contains("username") => UserConflict::Username.into(),
        _ => err.into(),
    }
}
