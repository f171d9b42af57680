use std::sync::Arc;
use uuid::Uuid;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};

use super::error::AuthError;
use super::types::{
    AuthSession, AuthUser, Claims, LoginRequest, RegisterRequest, UpdateProfileRequest, UserProfile,
};
use crate::storage::user::entity::Model as UserModel;
use crate::storage::{UserConflict, UserStorage};
use tracing::{info, warn};

const BEARER_PREFIX: &str = "Bearer ";

pub struct Auth {
    users: Arc<dyn UserStorage>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    hash_cost: u32,
}

impl Auth {
    pub fn new(users: Arc<dyn UserStorage>, secret: &str, token_ttl: Duration) -> Self {
        Self {
            users,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
            hash_cost: 10,
        }
    }

    pub fn with_hash_cost(mut self, hash_cost: u32) -> Self {
        self.hash_cost = hash_cost;
        self
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<AuthSession, AuthError> {
        let username = required(req.username)?;
        let email = required(req.email)?;
        let password = req.password.filter(|p| !p.is_empty()).ok_or(AuthError::MissingFields)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }
        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let user = UserModel {
            id: format!("user-{}", Uuid::new_v4()),
            username,
            email,
            password_hash: hash_password(password, self.hash_cost).await?,
            created_at: Utc::now(),
        };
        // the lookups above can race a concurrent registration
        self.users.create(&user).await.map_err(|e| match e.downcast_ref::<UserConflict>().copied() {
            Some(UserConflict::Email) => AuthError::EmailTaken,
            Some(UserConflict::Username) => AuthError::UsernameTaken,
            None => e.into(),
        })?;
        info!("Registered user {} ({})", user.username, user.id);

        let token = self.issue_token(&user)?;
        Ok(AuthSession { token, user: user.into() })
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthSession, AuthError> {
        let email = required(req.email)?;
        let password = req.password.filter(|p| !p.is_empty()).ok_or(AuthError::MissingFields)?;

        let user = self.users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, user.password_hash.clone()).await? {
            warn!("Failed login for {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;
        Ok(AuthSession { token, user: user.into() })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }

    /// Resolves an `Authorization` header value to a live user.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<AuthUser, AuthError> {
        let token = header
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::Unauthenticated)?;

        let claims = self.verify_token(token)?;
        let user = self.users
            .get(&claims.id)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        Ok(AuthUser { id: user.id, email: user.email })
    }

    pub async fn profile(&self, user_id: &str) -> Result<UserProfile, AuthError> {
        self.users
            .get(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn update_profile(&self, user_id: &str, req: UpdateProfileRequest) -> Result<UserProfile, AuthError> {
        let mut user = self.users.get(user_id).await?.ok_or(AuthError::UserNotFound)?;

        let username = non_empty(req.username);
        let email = non_empty(req.email);

        if let Some(email) = &email {
            if let Some(other) = self.users.find_by_email(email).await? {
                if other.id != user.id {
                    return Err(AuthError::IdentityTaken);
                }
            }
        }
        if let Some(username) = &username {
            if let Some(other) = self.users.find_by_username(username).await? {
                if other.id != user.id {
                    return Err(AuthError::IdentityTaken);
                }
            }
        }

        if let Some(username) = username {
            user.username = username;
        }
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(password) = req.password.filter(|p| !p.is_empty()) {
            user.password_hash = hash_password(password, self.hash_cost).await?;
        }

        self.users.update(&user).await.map_err(|e| match e.downcast_ref::<UserConflict>().copied() {
            Some(_) => AuthError::IdentityTaken,
            None => e.into(),
        })?;
        info!("Updated profile of {}", user.id);
        Ok(user.into())
    }

    fn issue_token(&self, user: &UserModel) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.token_ttl)
            .ok_or_else(|| AuthError::Internal("token lifetime out of range".to_string()))?;
        let claims = Claims {
            id: user.id.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required(value: Option<String>) -> Result<String, AuthError> {
    non_empty(value).ok_or(AuthError::MissingFields)
}

// bcrypt runs on the blocking pool
async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .map_err(|e| AuthError::Internal(e.to_string()))
}

async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .map_err(|e| AuthError::Internal(e.to_string()))
}
