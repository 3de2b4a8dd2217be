use std::collections::HashMap;

use dirsign_core::protocol::ServerProtocol;

/// Shared application state passed to all handlers via Axum's State extractor.
pub struct AppState {
    pub protocol: ServerProtocol,
    /// User to lowercase hex SHA-256 password hash; `None` disables basic auth.
    pub accounts: Option<HashMap<String, String>>,
}
