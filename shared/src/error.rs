use sea_orm::DbErr;
use thiserror::Error;

/// Failures of tracker operations. Everything except `Database` is a user
/// facing outcome that the web layer turns into a flash message.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NoChanges(String),
    #[error("{0}")]
    MarketData(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl TrackerError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn no_changes(message: impl Into<String>) -> Self {
        Self::NoChanges(message.into())
    }

    pub fn market_data(message: impl Into<String>) -> Self {
        Self::MarketData(message.into())
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
