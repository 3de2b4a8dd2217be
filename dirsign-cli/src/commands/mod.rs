//! CLI command implementations (register, verify, check, fingerprint, hash-password).

pub mod register;
pub mod verify;
pub mod check;
pub mod fingerprint;
pub mod hash_password;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use dirsign_core::constants::CLIENT_STORE_FILE;
use dirsign_core::platform::{OsRandom, SystemClock};
use dirsign_core::protocol::Client;

use crate::transport::HttpTransport;

/// Options shared by every command that talks to a folder or a server.
#[derive(Args, Debug, Clone)]
pub struct ClientOptions {
    /// Server base URL
    #[arg(long, env = "DIRSIGN_SERVER", default_value = "http://127.0.0.1:8123", global = true)]
    pub server: String,

    /// Folder to sign
    #[arg(long, env = "DIRSIGN_PATH", default_value = ".", global = true)]
    pub path: PathBuf,

    /// Local record file name, kept inside the folder
    #[arg(long, env = "DIRSIGN_STORE_FILE", default_value = CLIENT_STORE_FILE, global = true)]
    pub store_file: String,

    /// Basic-auth user
    #[arg(long, env = "DIRSIGN_AUTH_USER", global = true)]
    pub auth_user: Option<String>,

    /// Basic-auth password
    #[arg(long, env = "DIRSIGN_AUTH_PASSWORD", hide_env_values = true, global = true)]
    pub auth_password: Option<String>,
}

impl ClientOptions {
    /// Absolute folder path, so the same folder always yields the same key.
    pub fn folder(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        std::fs::canonicalize(&self.path)
            .map_err(|e| format!("cannot open folder {}: {e}", self.path.display()).into())
    }

    pub fn client(&self) -> Result<Client<HttpTransport>, Box<dyn std::error::Error>> {
        let mut transport = HttpTransport::new(&self.server)?;
        if let Some(user) = &self.auth_user {
            transport = transport.with_basic_auth(user, self.auth_password.clone().unwrap_or_default());
        }

        Ok(Client::new(
            transport,
            self.folder()?,
            Arc::new(OsRandom::new()),
            Arc::new(SystemClock::new()),
        )
        .with_store_file(self.store_file.clone()))
    }
}
