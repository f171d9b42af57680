use std::fmt::Display;

#[derive(Debug)]
pub enum AuthError {
    MissingFields,
    EmailTaken,
    UsernameTaken,
    IdentityTaken,
    InvalidCredentials,
    Unauthenticated,
    InvalidToken,
    TokenExpired,
    UserNotFound,
    StorageError(String),
    Internal(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingFields => write!(f, "All fields are required"),
            AuthError::EmailTaken => write!(f, "Email already registered"),
            AuthError::UsernameTaken => write!(f, "Username taken"),
            AuthError::IdentityTaken => write!(f, "Email or username already taken"),
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::Unauthenticated => write!(f, "Please authenticate"),
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::TokenExpired => write!(f, "Token expired"),
            AuthError::UserNotFound => write!(f, "User not found"),
            AuthError::StorageError(e) => write!(f, "Storage error: {}", e),
            AuthError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<anyhow::Error> for AuthError {
    fn from(error: anyhow::Error) -> Self {
        AuthError::StorageError(error.to_string())
    }
}
