use thiserror::Error;

/// Failures of the file-backed check store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("check already exists: {0}")]
    DuplicateId(String),
    #[error("check not found: {0}")]
    NotFound(String),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("persisted checks are corrupt: {0}")]
    Corrupt(String),
    #[error("cannot encode checks: {0}")]
    Encode(String),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("endpoint exists: {0}")]
    DuplicateId(String),
    #[error("check not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateId(id) => Self::DuplicateId(id),
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Io(_) | StoreError::Corrupt(_) | StoreError::Encode(_) => Self::Storage(e.to_string()),
        }
    }
}
