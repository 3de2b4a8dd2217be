use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::constants::{CLIENT_CHALLENGE_LEN, CLIENT_STORE_FILE};
use crate::error::{DirsignError, Result};
use crate::fingerprint::Fingerprinter;
use crate::message::{ChallengeMessage, NegotiateMessage};
use crate::record::ClientRecord;
use crate::traits::{Clock, Endpoint, Reply, SecureRandom, Transport};

/// Client half of both flows for one local folder.
///
/// The local record lives inside the folder and is excluded from the
/// fingerprint.
pub struct Client<T: Transport> {
    transport: T,
    folder: PathBuf,
    store_file: String,
    rng: Arc<dyn SecureRandom>,
    clock: Arc<dyn Clock>,
}

impl<T: Transport> Client<T> {
    pub fn new(
        transport: T,
        folder: impl Into<PathBuf>,
        rng: Arc<dyn SecureRandom>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transport,
            folder: folder.into(),
            store_file: CLIENT_STORE_FILE.to_string(),
            rng,
            clock,
        }
    }

    /// Use a different local record file name.
    pub fn with_store_file(mut self, name: impl Into<String>) -> Self {
        self.store_file = name.into();
        self
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn record_path(&self) -> PathBuf {
        self.folder.join(&self.store_file)
    }

    pub fn has_record(&self) -> bool {
        ClientRecord::exists(&self.record_path())
    }

    pub fn fingerprint(&self) -> Result<String> {
        Fingerprinter::new(&self.folder)
            .exclude(self.store_file.clone())
            .compute()
    }

    fn folder_name(&self) -> String {
        self.folder.to_string_lossy().into_owned()
    }

    /// Register the folder for `user` on `host_name`.
    ///
    /// The local record is written first and removed again unless the server
    /// answers 200. Once accepted the record stays even if the reply body does
    /// not decode, in which case no challenge is returned.
    pub async fn register(&self, user: &str, host_name: &str) -> Result<Option<ChallengeMessage>> {
        let path = self.record_path();
        if ClientRecord::exists(&path) {
            return Err(DirsignError::Conflict(format!(
                "local record already exists at {}",
                path.display()
            )));
        }

        let client_challenge = self.rng.random_bytes(CLIENT_CHALLENGE_LEN)?;
        let record = ClientRecord::new(
            user,
            host_name,
            self.folder_name(),
            &client_challenge,
            self.clock.as_ref(),
        )?;
        record.save(&path)?;

        let reply = match self.send_registration(&record, client_challenge).await {
            Ok(reply) => reply,
            Err(e) => {
                if let Err(rm) = ClientRecord::remove(&path) {
                    tracing::warn!(path = %path.display(), error = %rm, "failed to remove local record");
                }
                return Err(e);
            }
        };

        match ChallengeMessage::unmarshal(&reply.body) {
            Ok(challenge) => {
                tracing::info!(
                    user = %record.user,
                    folder = %record.path,
                    session = %hex::encode(challenge.session_id),
                    "signature generated"
                );
                Ok(Some(challenge))
            }
            Err(e) => {
                tracing::warn!(
                    user = %record.user,
                    folder = %record.path,
                    error = %e,
                    "registration accepted but challenge reply did not decode"
                );
                Ok(None)
            }
        }
    }

    /// Post the negotiate message; anything but 200 is an error.
    async fn send_registration(&self, record: &ClientRecord, client_challenge: Vec<u8>) -> Result<Reply> {
        let mut negotiate = NegotiateMessage::new(&record.user, &record.host_name, &record.path);
        negotiate.fingerprint = self.fingerprint()?;
        negotiate.client_challenge = client_challenge;

        let reply = self
            .transport
            .post(Endpoint::Challenge, negotiate.marshal()?)
            .await?;

        match reply.status {
            200 => Ok(reply),
            409 => Err(DirsignError::Conflict("already exists".to_string())),
            _ => Err(rejected(reply)),
        }
    }

    /// Check the folder against the registration in the local record.
    pub async fn verify(&self) -> Result<()> {
        let record = ClientRecord::load(&self.record_path())?;

        let mut negotiate = NegotiateMessage::new(&record.user, &record.host_name, &record.path);
        negotiate.fingerprint = self.fingerprint()?;
        negotiate.client_challenge = record.client_challenge_bytes()?;

        let reply = self
            .transport
            .post(Endpoint::Retrieve, negotiate.marshal()?)
            .await?;

        match reply.status {
            200 => {
                tracing::info!(user = %record.user, folder = %record.path, "same signature");
                Ok(())
            }
            403 => Err(DirsignError::Mismatch(reply.body_text())),
            404 => Err(DirsignError::NotFound(reply.body_text())),
            _ => Err(rejected(reply)),
        }
    }
}

fn rejected(reply: Reply) -> DirsignError {
    DirsignError::Rejected {
        status: reply.status,
        message: reply.body_text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;

    use async_trait::async_trait;

    use crate::platform::{OsRandom, SystemClock};

    /// Replies with a canned status and body, recording what was posted.
    struct CannedTransport {
        reply: std::result::Result<Reply, String>,
        posted: RefCell<Vec<(Endpoint, Vec<u8>)>>,
    }

    impl CannedTransport {
        fn status(status: u16, body: &[u8]) -> Self {
            Self {
                reply: Ok(Reply {
                    status,
                    body: body.to_vec(),
                }),
                posted: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err("connection refused".to_string()),
                posted: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl Transport for CannedTransport {
        async fn post(&self, endpoint: Endpoint, body: Vec<u8>) -> Result<Reply> {
            self.posted.borrow_mut().push((endpoint, body));
            self.reply.clone().map_err(DirsignError::Transport)
        }
    }

    fn client(dir: &Path, transport: CannedTransport) -> Client<CannedTransport> {
        fs::write(dir.join("data.txt"), b"payload").unwrap();
        Client::new(
            transport,
            dir,
            Arc::new(OsRandom::new()),
            Arc::new(SystemClock::new()),
        )
    }

    #[tokio::test]
    async fn test_conflict_removes_record() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(dir.path(), CannedTransport::status(409, b"exists"));

        let err = client.register("alice", "host1").await.unwrap_err();
        assert!(matches!(err, DirsignError::Conflict(ref m) if m == "already exists"));
        assert!(!client.has_record());
    }

    #[tokio::test]
    async fn test_transport_failure_removes_record() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(dir.path(), CannedTransport::failing());

        let err = client.register("alice", "host1").await.unwrap_err();
        assert!(matches!(err, DirsignError::Transport(_)));
        assert!(!client.has_record());
    }

    #[tokio::test]
    async fn test_server_error_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(dir.path(), CannedTransport::status(500, b"boom"));

        let err = client.register("alice", "host1").await.unwrap_err();
        assert!(matches!(
            err,
            DirsignError::Rejected { status: 500, ref message } if message == "boom"
        ));
        assert!(!client.has_record());
    }

    #[tokio::test]
    async fn test_undecodable_ok_reply_keeps_record() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(dir.path(), CannedTransport::status(200, b"<html>ok</html>"));

        let challenge = client.register("alice", "host1").await.unwrap();
        assert!(challenge.is_none());
        assert!(client.has_record());

        let record = ClientRecord::load(&client.record_path()).unwrap();
        assert_eq!(record.user, "alice");
        assert_eq!(record.client_challenge_bytes().unwrap().len(), CLIENT_CHALLENGE_LEN);
    }

    #[tokio::test]
    async fn test_register_posts_negotiate() {
        let dir = tempfile::tempdir().unwrap();
        let mut negotiate = NegotiateMessage::new("alice", "host1", "x");
        negotiate.client_challenge = vec![0; 64];
        let body = ChallengeMessage::for_negotiate(&negotiate, [1; 24], [2; 64], [3; 8])
            .marshal()
            .unwrap();
        let client = client(dir.path(), CannedTransport::status(200, &body));

        let challenge = client.register("alice", "host1").await.unwrap().unwrap();
        assert_eq!(challenge.session_id, [1; 24]);
        assert!(client.has_record());

        let posted = client.transport.posted.borrow();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].0, Endpoint::Challenge);
        let sent = NegotiateMessage::unmarshal(&posted[0].1).unwrap();
        let record = ClientRecord::load(&client.record_path()).unwrap();
        assert_eq!(sent.user_name, "alice");
        assert_eq!(sent.folder_name, record.path);
        assert_eq!(sent.client_challenge, record.client_challenge_bytes().unwrap());
        assert_eq!(sent.fingerprint, client.fingerprint().unwrap());
    }

    #[tokio::test]
    async fn test_existing_record_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(dir.path(), CannedTransport::status(409, b""));
        fs::write(client.record_path(), b"{}").unwrap();

        let err = client.register("alice", "host1").await.unwrap_err();
        assert!(matches!(err, DirsignError::Conflict(_)));
        assert!(client.has_record());
        assert!(client.transport.posted.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_verify_without_record() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(dir.path(), CannedTransport::status(200, b""));
        assert!(matches!(client.verify().await, Err(DirsignError::NotFound(_))));
        assert!(client.transport.posted.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_verify_maps_statuses() {
        for status in [403u16, 404, 500] {
            let dir = tempfile::tempdir().unwrap();
            let client = client(dir.path(), CannedTransport::status(status, b"no"));
            ClientRecord::new("alice", "host1", "p", &[0; 64], &SystemClock::new())
                .unwrap()
                .save(&client.record_path())
                .unwrap();

            let err = client.verify().await.unwrap_err();
            let expected = match status {
                403 => matches!(err, DirsignError::Mismatch(_)),
                404 => matches!(err, DirsignError::NotFound(_)),
                _ => matches!(err, DirsignError::Rejected { status: 500, .. }),
            };
            assert!(expected, "status {status}: {err}");
            assert!(client.has_record());
        }
    }
}
