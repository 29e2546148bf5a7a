use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetCoreError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct StorageError(pub String);
