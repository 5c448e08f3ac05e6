use domain::{DomainError, RepositoryError};
use thiserror::Error;

/// 调用方可依赖的稳定错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Storage,
    Timeout,
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("subscription {id} not found")]
    NotFound { id: String },
    #[error("repository error: {0}")]
    Repository(RepositoryError),
    #[error("{operation} timed out")]
    Timeout { operation: &'static str },
}

impl ApplicationError {
    pub fn not_found(id: impl Into<String>) -> Self {
        ApplicationError::NotFound { id: id.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApplicationError::Domain(DomainError::InvalidArgument { .. }) => ErrorKind::Validation,
            ApplicationError::NotFound { .. } => ErrorKind::NotFound,
            ApplicationError::Repository(RepositoryError::NotFound) => ErrorKind::NotFound,
            ApplicationError::Repository(_) => ErrorKind::Storage,
            ApplicationError::Timeout { .. } => ErrorKind::Timeout,
        }
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Repository(value)
    }
}
