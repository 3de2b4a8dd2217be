use sha2::{Digest, Sha256};

/// Hex SHA-256 of a password, as stored in the server's account list.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}
