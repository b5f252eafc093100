use crate::types::Category;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DialecticError {
    #[error("not initialized: run 'dialectic init'")]
    NotInitialized,

    #[error("no template configured for category '{0}'")]
    MissingTemplate(Category),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("documentation base directory does not exist: {0}")]
    BaseDirMissing(String),

    #[error("target path escapes the documentation base directory: {0}")]
    PathEscape(String),

    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DialecticError>;
