use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing `{0}` environment variable")]
    MissingEnvVar(String),

    #[error("Invalid value for `{name}`: `{value}`")]
    InvalidConfig { name: String, value: String },

    #[error("Malformed feed record: missing `{0}`")]
    MalformedRecord(&'static str),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Token `{0}` was already marked processed")]
    DuplicateProcessing(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Migration failure: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Notification failed: {0}")]
    Notify(String),

    #[error("Redis connection error: {0}")]
    RedisConnection(String),
}

impl AppError {
    /// Faults that stop the remaining work of a cycle instead of a single token
    pub fn is_fatal_for_cycle(&self) -> bool {
        matches!(self, AppError::Storage(_) | AppError::Migration(_))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::UpstreamUnavailable(err.to_string())
    }
}
