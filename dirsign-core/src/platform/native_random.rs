use crate::error::DirsignError;
use crate::traits::random::SecureRandom;

/// SecureRandom backed by the OS CSPRNG via getrandom.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl OsRandom {
    pub fn new() -> Self {
        Self
    }
}

impl SecureRandom for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), DirsignError> {
        getrandom::getrandom(dest)
            .map_err(|e| DirsignError::Platform(format!("getrandom failed: {e}")))
    }
}
