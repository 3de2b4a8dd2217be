pub mod password;
pub mod response;

pub use password::hash_password;
pub use response::{create_hash, create_response, responses_match, HASH_LEN, RESPONSE_LEN};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("HMAC key rejected: {0}")]
    InvalidKey(String),
    #[error("Invalid {field} length: expected {expected}, got {got}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        got: usize,
    },
}

pub type Result<T> = std::result::Result<T, CryptoError>;
