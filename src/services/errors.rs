use thiserror::Error;

use crate::auth::AuthError;
use crate::cdn::CdnError;
use crate::repository::RepositoryError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Outcome of a service call that routes translate into responses.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller is not an administrator.
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    /// The change collides with existing data.
    #[error("conflict")]
    Conflict,
    /// Submitted data failed validation; the message is user-facing.
    #[error("{0}")]
    Form(String),
    /// Sign-in, sign-up or session failure; the message is user-facing.
    #[error("{0}")]
    Auth(String),
    /// An external service (image host) failed or is unavailable.
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::Conflict(_) => ServiceError::Conflict,
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<CdnError> for ServiceError {
    fn from(value: CdnError) -> Self {
        match value {
            CdnError::NotConfigured => {
                ServiceError::Upstream("image hosting is not configured".to_string())
            }
            other => ServiceError::Upstream(other.to_string()),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::InvalidCredentials(_) => {
                ServiceError::Auth("Invalid email or password.".to_string())
            }
            AuthError::SessionExpired => {
                ServiceError::Auth("Your session has expired. Please sign in again.".to_string())
            }
            AuthError::Rejected { message, .. } => ServiceError::Auth(message),
            AuthError::Transport(err) => ServiceError::Upstream(err.to_string()),
            AuthError::Decode(err) => ServiceError::Internal(err.to_string()),
        }
    }
}
