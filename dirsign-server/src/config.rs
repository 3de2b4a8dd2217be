use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use dirsign_core::constants::SERVER_STORE_FILE;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};

/// Server configuration, read from a JSON file and overridable from the
/// environment.
///
/// - `DIRSIGN_LISTEN`: listen address, default `127.0.0.1:8123`.
/// - `DIRSIGN_STORE_DIR`: directory holding the session store file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub listen: String,
    pub store_dir: PathBuf,
    pub users: UsersConfig,
    pub secure: SecureConfig,
}

/// Basic-auth accounts; `hash` is the hex SHA-256 of the password.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UsersConfig {
    pub enable: bool,
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub user: String,
    pub hash: String,
}

/// TLS termination with PEM files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecureConfig {
    pub enable: bool,
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8123".to_string(),
            store_dir: PathBuf::from("."),
            users: UsersConfig::default(),
            secure: SecureConfig::default(),
        }
    }
}

impl Default for SecureConfig {
    fn default() -> Self {
        Self {
            enable: false,
            cert: PathBuf::from("cert.pem"),
            key: PathBuf::from("key.pem"),
        }
    }
}

impl Config {
    /// Read `path`. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read(path) {
            Ok(data) => serde_json::from_slice(&data)
                .map_err(|e| ServerError::Config(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ServerError::Config(format!("{}: {e}", path.display()))),
        }
    }

    /// Apply `DIRSIGN_LISTEN` / `DIRSIGN_STORE_DIR` when set.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            env::var("DIRSIGN_LISTEN").ok(),
            env::var("DIRSIGN_STORE_DIR").ok(),
        );
    }

    fn apply_overrides(&mut self, listen: Option<String>, store_dir: Option<String>) {
        if let Some(listen) = listen.filter(|s| !s.is_empty()) {
            self.listen = listen;
        }
        if let Some(dir) = store_dir.filter(|s| !s.is_empty()) {
            self.store_dir = PathBuf::from(dir);
        }
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid listen address {}: {e}", self.listen)))
    }

    pub fn store_file(&self) -> PathBuf {
        self.store_dir.join(SERVER_STORE_FILE)
    }

    /// Account table when basic auth is enabled.
    pub fn accounts(&self) -> Option<HashMap<String, String>> {
        self.users.enable.then(|| {
            self.users
                .accounts
                .iter()
                .map(|a| (a.user.clone(), a.hash.to_lowercase()))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.listen_addr().unwrap().port(), 8123);
        assert!(config.accounts().is_none());
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "listen": "0.0.0.0:9000",
                "storeDir": "/var/lib/dirsign",
                "users": { "enable": true, "accounts": [ { "user": "ops", "hash": "ABCD" } ] },
                "secure": { "enable": true, "cert": "/etc/tls/cert.pem" }
            }"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.listen, "0.0.0.0:9000");
        assert_eq!(
            config.store_file(),
            PathBuf::from("/var/lib/dirsign").join("dirsign.server.store")
        );
        assert_eq!(config.accounts().unwrap()["ops"], "abcd");
        assert!(config.secure.enable);
        assert_eq!(config.secure.cert, PathBuf::from("/etc/tls/cert.pem"));
        assert_eq!(config.secure.key, PathBuf::from("key.pem"));
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(Config::load(&path), Err(ServerError::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(Some("127.0.0.1:1".into()), None);
        assert_eq!(config.listen, "127.0.0.1:1");
        assert_eq!(config.store_dir, PathBuf::from("."));

        config.apply_overrides(Some(String::new()), Some("/data".into()));
        assert_eq!(config.listen, "127.0.0.1:1");
        assert_eq!(config.store_dir, PathBuf::from("/data"));
    }

    #[test]
    fn test_bad_listen_address() {
        let config = Config {
            listen: "nowhere".into(),
            ..Config::default()
        };
        assert!(config.listen_addr().is_err());
    }
}
