use super::{ChallengeMessage, FixedReader, Header, MessageError, MessageType, NegotiateFlags, Result, VarField};
use crate::constants::CLIENT_CHALLENGE_LEN;
use crate::traits::{Clock, SecureRandom};

/// Client answer to a challenge.
///
/// The codec is complete but the protocol driver does not send it yet, and
/// [`build`](Self::build) leaves `hash` empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthenticateMessage {
    pub hash: Vec<u8>,
    pub session_id: Vec<u8>,
    pub timestamp: Vec<u8>,
    /// Drawn by `build`; never encoded.
    pub client_challenge: Vec<u8>,
    pub negotiate_flags: NegotiateFlags,
}

impl AuthenticateMessage {
    /// Header, three descriptors, 8 reserved bytes and the flags.
    pub const FIXED_SIZE: usize = Header::SIZE + 3 * VarField::SIZE + 8 + 4;

    /// Prepare an answer to `challenge`: same flags and session, the
    /// challenge's timestamp (or now) and a fresh client challenge.
    pub fn build(
        challenge: &ChallengeMessage,
        rng: &dyn SecureRandom,
        clock: &dyn Clock,
    ) -> crate::error::Result<Self> {
        let timestamp = match challenge.timestamp() {
            Some(ts) => ts,
            None => clock.filetime()?,
        };

        Ok(Self {
            hash: Vec::new(),
            session_id: challenge.session_id.to_vec(),
            timestamp: timestamp.to_vec(),
            client_challenge: rng.random_bytes(CLIENT_CHALLENGE_LEN)?,
            negotiate_flags: challenge.flags,
        })
    }

    pub fn marshal(&self) -> Result<Vec<u8>> {
        if !self.negotiate_flags.contains(NegotiateFlags::UNICODE) {
            return Err(MessageError::MissingFlag("UNICODE"));
        }

        let mut next = Self::FIXED_SIZE;
        let hash = VarField::allocate("hash", &mut next, self.hash.len())?;
        let session_id = VarField::allocate("session_id", &mut next, self.session_id.len())?;
        let timestamp = VarField::allocate("timestamp", &mut next, self.timestamp.len())?;

        let mut flags = self.negotiate_flags;
        flags.remove(NegotiateFlags::VERSION);

        let mut buf = Vec::with_capacity(next);
        buf.extend_from_slice(&Header::new(MessageType::Authenticate).serialize());
        buf.extend_from_slice(&hash.serialize());
        buf.extend_from_slice(&session_id.serialize());
        buf.extend_from_slice(&timestamp.serialize());
        buf.extend_from_slice(&[0u8; 8]);
        buf.extend_from_slice(&flags.bits().to_le_bytes());

        buf.extend_from_slice(&self.hash);
        buf.extend_from_slice(&self.session_id);
        buf.extend_from_slice(&self.timestamp);
        Ok(buf)
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self> {
        Header::deserialize(data, MessageType::Authenticate)?;
        let mut reader = FixedReader::after_header(data, Self::FIXED_SIZE)?;

        let hash = reader.var_field()?;
        let session_id = reader.var_field()?;
        let timestamp = reader.var_field()?;
        reader.skip(8)?;
        let negotiate_flags = NegotiateFlags::from_wire(reader.u32()?);

        Ok(Self {
            hash: hash.read_bytes_from(data)?,
            session_id: session_id.read_bytes_from(data)?,
            timestamp: timestamp.read_bytes_from(data)?,
            client_challenge: Vec::new(),
            negotiate_flags,
        })
    }
}
