//! Persisted records: the client's pending/registered record and the
//! server's per-key record. Binary values are stored as lowercase hex.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DirsignError, Result};
use crate::traits::Clock;

fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>> {
    hex::decode(value).map_err(|e| DirsignError::Serialization(format!("{field}: {e}")))
}

/// Local record written into the signed folder before registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    pub user: String,
    pub host_name: String,
    pub path: String,
    pub client_challenge: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub epoch: u64,
}

impl ClientRecord {
    pub fn new(
        user: impl Into<String>,
        host_name: impl Into<String>,
        path: impl Into<String>,
        client_challenge: &[u8],
        clock: &dyn Clock,
    ) -> Result<Self> {
        Ok(Self {
            user: user.into(),
            host_name: host_name.into(),
            path: path.into(),
            client_challenge: hex::encode(client_challenge),
            epoch: clock.now_millis()?,
        })
    }

    pub fn client_challenge_bytes(&self) -> Result<Vec<u8>> {
        decode_hex("clientChallenge", &self.client_challenge)
    }

    pub fn load(file: &Path) -> Result<Self> {
        let data = match fs::read(file) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(DirsignError::NotFound(format!(
                    "no local record at {}",
                    file.display()
                )))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn save(&self, file: &Path) -> Result<()> {
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(file, data)?;
        Ok(())
    }

    /// Delete the record file. A file that is already gone is not an error.
    pub fn remove(file: &Path) -> Result<()> {
        match fs::remove_file(file) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn exists(file: &Path) -> bool {
        file.is_file()
    }
}

/// Server-side registration, immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRecord {
    pub user: String,
    pub host_name: String,
    pub path: String,
    pub server_challenge: String,
    pub timestamp: String,
    pub response: String,
    #[serde(default)]
    pub session_id: String,
}

impl ServerRecord {
    pub fn server_challenge_bytes(&self) -> Result<Vec<u8>> {
        decode_hex("serverChallenge", &self.server_challenge)
    }

    pub fn timestamp_bytes(&self) -> Result<Vec<u8>> {
        decode_hex("timestamp", &self.timestamp)
    }

    pub fn response_bytes(&self) -> Result<Vec<u8>> {
        decode_hex("response", &self.response)
    }
}
