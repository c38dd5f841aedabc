//! Template error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Duplicate resource logical id: {0}")]
    DuplicateResource(String),

    #[error("Duplicate output name: {0}")]
    DuplicateOutput(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Invalid resource properties for {0}: expected a JSON object")]
    InvalidProperties(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
