use crate::constants::FILETIME_UNIX_EPOCH;
use crate::error::DirsignError;

pub trait Clock: Send + Sync {
    /// Nanoseconds since the Unix epoch.
    fn now_nanos(&self) -> Result<u64, DirsignError>;

    fn now_millis(&self) -> Result<u64, DirsignError> {
        Ok(self.now_nanos()? / 1_000_000)
    }

    /// Current time as a little-endian Windows FILETIME (100ns ticks since 1601).
    fn filetime(&self) -> Result<[u8; 8], DirsignError> {
        let ticks = self.now_nanos()? / 100 + FILETIME_UNIX_EPOCH;
        Ok(ticks.to_le_bytes())
    }
}
