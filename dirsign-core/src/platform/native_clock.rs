use std::time::SystemTime;

use crate::error::DirsignError;
use crate::traits::clock::Clock;

/// Clock backed by std::time::SystemTime.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now_nanos(&self) -> Result<u64, DirsignError> {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .map_err(|e| DirsignError::Platform(format!("SystemTime error: {e}")))
    }
}
