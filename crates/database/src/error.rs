use models::{registration::RegistrationError, transition::IllegalTransition};
use sea_orm::{DbErr, SqlErr};
use storage::StorageError;
use thiserror::Error;
use validator::ValidationErrors;

/// Failure of a service operation, recovered at the request boundary
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Les données envoyées sont invalides.")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    StateConflict(String),

    #[error("{0} introuvable")]
    NotFound(&'static str),

    #[error(transparent)]
    Database(#[from] DbErr),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServiceError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Authorization(message.into())
    }

    /// Maps a unique-index violation to a conflict with a friendly message.
    ///
    /// Concurrent duplicate registrations are only caught here.
    pub fn conflict_on_duplicate(err: DbErr, message: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::StateConflict(message.to_owned()),
            _ => Self::Database(err),
        }
    }
}

impl From<RegistrationError> for ServiceError {
    fn from(err: RegistrationError) -> Self {
        Self::StateConflict(err.to_string())
    }
}

impl From<IllegalTransition> for ServiceError {
    fn from(err: IllegalTransition) -> Self {
        Self::StateConflict(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
