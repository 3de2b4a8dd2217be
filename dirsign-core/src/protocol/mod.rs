//! Register and verify flows, client and server side.

pub mod client;
pub mod server;

pub use client::Client;
pub use server::ServerProtocol;

use crate::constants::CLIENT_CHALLENGE_LEN;
use crate::error::DirsignError;
use crate::message::{MessageError, NegotiateMessage};

/// HTTP status a server reports for a failed request.
pub fn status_code(err: &DirsignError) -> u16 {
    match err {
        DirsignError::Conflict(_) => 409,
        DirsignError::NotFound(_) => 404,
        DirsignError::Mismatch(_) => 403,
        _ => 500,
    }
}

pub(crate) fn check_client_challenge(negotiate: &NegotiateMessage) -> Result<(), MessageError> {
    if negotiate.client_challenge.len() != CLIENT_CHALLENGE_LEN {
        return Err(MessageError::InvalidField {
            field: "client_challenge",
            reason: format!(
                "expected {CLIENT_CHALLENGE_LEN} bytes, got {}",
                negotiate.client_challenge.len()
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(status_code(&DirsignError::Conflict("k".into())), 409);
        assert_eq!(status_code(&DirsignError::NotFound("k".into())), 404);
        assert_eq!(status_code(&DirsignError::Mismatch("k".into())), 403);
        assert_eq!(status_code(&DirsignError::Io("disk".into())), 500);
        assert_eq!(
            status_code(&DirsignError::Message(MessageError::InvalidSignature)),
            500
        );
    }

    #[test]
    fn test_client_challenge_length() {
        let mut negotiate = NegotiateMessage::default();
        negotiate.client_challenge = vec![0; 63];
        assert!(check_client_challenge(&negotiate).is_err());
        negotiate.client_challenge = vec![0; 64];
        assert!(check_client_challenge(&negotiate).is_ok());
    }
}
