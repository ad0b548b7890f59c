use thiserror::Error;

use crate::entity::FieldErrors;

#[derive(Error, Debug)]
pub enum QuickNotesError {
    #[error("Note not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Client error: {0}")]
    Client(#[from] crate::client::ClientError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuickNotesError>;
