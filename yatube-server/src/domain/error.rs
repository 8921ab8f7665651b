use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("{resource} not found: {key}")]
    NotFound { resource: &'static str, key: String },

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("forbidden")]
    Forbidden,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}

impl DomainError {
    pub(crate) fn validation(field: &'static str, message: &'static str) -> Self {
        Self::Validation { field, message }
    }

    pub(crate) fn not_found(resource: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            resource,
            key: key.to_string(),
        }
    }
}
