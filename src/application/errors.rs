use crate::domain::errors::{MoneyError, ValidationErrors};
use crate::domain::repositories::RepositoryError;
use thiserror::Error;

pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The record kept changing underneath the operation
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<MoneyError> for ApplicationError {
    fn from(error: MoneyError) -> Self {
        ApplicationError::Validation(error.into())
    }
}

impl ApplicationError {
    pub fn not_found(entity: &'static str, id: &str) -> Self {
        ApplicationError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Validation messages, if this is a validation failure
    pub fn validation_messages(&self) -> Option<&[String]> {
        match self {
            ApplicationError::Validation(errors) => Some(errors.messages()),
            _ => None,
        }
    }
}
