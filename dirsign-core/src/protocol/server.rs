use std::sync::Arc;

use crate::constants::SERVER_CHALLENGE_LEN;
use crate::crypto::{create_hash, create_response, responses_match};
use crate::error::{DirsignError, Result};
use crate::identity::IdentityGenerator;
use crate::message::{ChallengeMessage, NegotiateMessage};
use crate::record::ServerRecord;
use crate::store::SessionStore;
use crate::traits::{Clock, SecureRandom};

use super::check_client_challenge;

/// Server half of both flows. Request bodies are marshaled negotiate messages.
pub struct ServerProtocol {
    store: Arc<SessionStore>,
    ids: IdentityGenerator,
    rng: Arc<dyn SecureRandom>,
    clock: Arc<dyn Clock>,
}

impl ServerProtocol {
    pub fn new(
        store: Arc<SessionStore>,
        rng: Arc<dyn SecureRandom>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let ids = IdentityGenerator::new(rng.as_ref())?;
        Ok(Self {
            store,
            ids,
            rng,
            clock,
        })
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Register a new (user, host, folder) key and answer with a marshaled
    /// challenge message. The store is written only when every step succeeds.
    pub fn register(&self, body: &[u8]) -> Result<Vec<u8>> {
        let negotiate = NegotiateMessage::unmarshal(body)?;
        check_client_challenge(&negotiate)?;

        let key = negotiate.derive_key();
        if self.store.contains(&key) {
            return Err(DirsignError::Conflict(format!("key {key} already registered")));
        }

        let mut server_challenge = [0u8; SERVER_CHALLENGE_LEN];
        self.rng.fill_bytes(&mut server_challenge)?;
        let timestamp = self.clock.filetime()?;
        let session_id = self.ids.next();

        let hash = create_hash(
            &negotiate.fingerprint,
            &negotiate.user_name,
            &negotiate.host_name,
            &negotiate.folder_name,
        )?;
        let response = create_response(
            &hash,
            &server_challenge,
            &negotiate.client_challenge,
            &timestamp,
        )?;

        let challenge =
            ChallengeMessage::for_negotiate(&negotiate, session_id, server_challenge, timestamp);
        let reply = challenge.marshal()?;

        self.store.insert_new(
            &key,
            ServerRecord {
                user: negotiate.user_name.clone(),
                host_name: negotiate.host_name.clone(),
                path: negotiate.folder_name.clone(),
                server_challenge: hex::encode(server_challenge),
                timestamp: hex::encode(timestamp),
                response: hex::encode(&response),
                session_id: hex::encode(session_id),
            },
        )?;

        tracing::info!(
            key = %key,
            user = %negotiate.user_name,
            host = %negotiate.host_name,
            folder = %negotiate.folder_name,
            session = %hex::encode(session_id),
            "folder registered"
        );
        Ok(reply)
    }

    /// Recompute the response for the stored challenge and compare it with
    /// the stored one.
    pub fn verify(&self, body: &[u8]) -> Result<()> {
        let negotiate = NegotiateMessage::unmarshal(body)?;
        check_client_challenge(&negotiate)?;

        let key = negotiate.derive_key();
        let record = self
            .store
            .get(&key)
            .ok_or_else(|| DirsignError::NotFound(format!("key {key} is not registered")))?;

        let hash = create_hash(
            &negotiate.fingerprint,
            &negotiate.user_name,
            &negotiate.host_name,
            &negotiate.folder_name,
        )?;
        let response = create_response(
            &hash,
            &record.server_challenge_bytes()?,
            &negotiate.client_challenge,
            &record.timestamp_bytes()?,
        )?;

        if !responses_match(&record.response_bytes()?, &response) {
            tracing::info!(key = %key, user = %negotiate.user_name, "signature mismatch");
            return Err(DirsignError::Mismatch(format!("signature for key {key} differs")));
        }

        tracing::info!(key = %key, user = %negotiate.user_name, "signature verified");
        Ok(())
    }
}
