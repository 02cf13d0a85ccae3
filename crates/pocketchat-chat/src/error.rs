use thiserror::Error;

/// Failures of the underlying key-value store
#[derive(Debug, Error)]
#[allow(clippy::enum_variant_names)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Storage unavailable: {message}")]
    Unavailable { message: String },

    #[error("Write to '{key}' rejected: {message}")]
    WriteRejected { key: String, message: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Text messages must have content")]
    EmptyContent,
}

/// Reasons a send is dropped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("A reply is still pending")]
    Busy,

    #[error("Nothing to send")]
    EmptyInput,
}

impl From<ModelError> for SendError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::EmptyContent => SendError::EmptyInput,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClearError {
    #[error("Clear confirmation token {0} is not outstanding")]
    UnknownToken(u64),
}
