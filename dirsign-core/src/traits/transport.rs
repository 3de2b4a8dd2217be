use async_trait::async_trait;

use crate::constants::{API_CHALLENGE, API_RETRIEVE};
use crate::error::DirsignError;

/// Server endpoint a negotiate message is posted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Challenge,
    Retrieve,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Challenge => API_CHALLENGE,
            Endpoint::Retrieve => API_RETRIEVE,
        }
    }
}

/// Status and body of a transport round trip.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[async_trait(?Send)]
pub trait Transport {
    /// Post an opaque binary body. Network failures are errors; any HTTP
    /// status, including non-200, is a `Reply`.
    async fn post(&self, endpoint: Endpoint, body: Vec<u8>) -> Result<Reply, DirsignError>;
}
