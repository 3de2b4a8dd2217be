use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirsignError {
    #[error("Message error: {0}")]
    Message(#[from] crate::message::MessageError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] crate::crypto::CryptoError),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Signature mismatch: {0}")]
    Mismatch(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Server rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

impl From<std::io::Error> for DirsignError {
    fn from(err: std::io::Error) -> Self {
        DirsignError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DirsignError {
    fn from(err: serde_json::Error) -> Self {
        DirsignError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DirsignError>;
