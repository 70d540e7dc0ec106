use thiserror::Error;

use crate::notifications::{self, Notificacion};
use crate::repository::errors::RepositoryError;

/// Failure of a screen-level operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The session role may not use the screen.
    #[error("unauthorized")]
    Unauthorized,

    /// The backend rejected the session token.
    #[error("session expired")]
    SessionExpired,

    #[error("{0}")]
    Form(String),

    #[error("not found")]
    NotFound,

    #[error("forbidden")]
    Forbidden,

    #[error("validation error: {0}")]
    Validation(String),

    /// Any other backend failure, already phrased for the user.
    #[error("{0}")]
    Backend(Notificacion),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Alert shown to the user for this failure.
    pub fn notificacion(&self) -> Notificacion {
        match self {
            ServiceError::Unauthorized => Notificacion::acceso_restringido(),
            ServiceError::SessionExpired => Notificacion::sesion_expirada(),
            ServiceError::Form(message) => Notificacion::validacion(Some(message)),
            ServiceError::NotFound => Notificacion::no_encontrado(),
            ServiceError::Forbidden => Notificacion::permisos_insuficientes(),
            ServiceError::Validation(detail) => Notificacion::validacion(Some(detail)),
            ServiceError::Backend(notificacion) => notificacion.clone(),
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Unauthorized => ServiceError::SessionExpired,
            RepositoryError::Forbidden => ServiceError::Forbidden,
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::Validation(detail) => ServiceError::Validation(detail),
            other => ServiceError::Backend(notifications::por_error(&other)),
        }
    }
}
