use thiserror::Error;

/// Failures surfaced by the service operations to the HTTP layer
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed, schema-invalid or externally referencing OpenAPI document
    #[error("invalid openapi document: {0}")]
    InvalidDocument(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{} not found", what))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
