use crate::config_manager::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OsintError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Search not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, OsintError>;
