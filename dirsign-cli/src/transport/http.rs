use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use dirsign_core::error::DirsignError;
use dirsign_core::traits::{Endpoint, Reply, Transport};

/// HTTP(S) transport posting marshaled messages to a dirsign server.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, DirsignError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| DirsignError::Transport(format!("HTTP client setup failed: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
        })
    }

    /// Send basic-auth credentials with every request.
    pub fn with_basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((user.into(), password.into()));
        self
    }

    pub fn url_for(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn post(&self, endpoint: Endpoint, body: Vec<u8>) -> Result<Reply, DirsignError> {
        let url = self.url_for(endpoint);
        debug!(%url, len = body.len(), "posting message");

        let mut request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| DirsignError::Transport(format!("POST {url} failed: {e}")))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| DirsignError::Transport(format!("reading reply from {url} failed: {e}")))?;

        debug!(%url, status, len = body.len(), "reply received");
        Ok(Reply {
            status,
            body: body.to_vec(),
        })
    }
}
