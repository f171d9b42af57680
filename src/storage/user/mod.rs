use async_trait::async_trait;
use anyhow::Result;
use thiserror::Error;
use crate::storage::user::entity::Model as UserModel;

pub mod entity;
pub mod mapping;
pub mod sqlite;

/// A write lost a race on a unique column. Carried inside the
/// `anyhow::Error` returned by `create` and `update`.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum UserConflict {
    #[error("email already registered")]
    Email,

    #[error("username taken")]
    Username,
}

#[async_trait]
pub trait UserStorage: Send + Sync + 'static {
    async fn create(&self, model: &UserModel) -> Result<()>;
    async fn get(&self, user_id: &str) -> Result<Option<UserModel>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>>;
    async fn update(&self, model: &UserModel) -> Result<()>;
}
