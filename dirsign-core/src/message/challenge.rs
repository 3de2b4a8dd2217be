use std::collections::HashMap;

use super::{FixedReader, Header, MessageError, MessageType, NegotiateFlags, NegotiateMessage, Result, VarField};
use crate::constants::{SERVER_CHALLENGE_LEN, SESSION_ID_LEN, TIMESTAMP_LEN};

/// Type id of a target-info entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AvId(pub u16);

impl AvId {
    /// Terminates the target-info block.
    pub const EOL: AvId = AvId(0);
    pub const TIMESTAMP: AvId = AvId(1);
}

/// Server answer to a registration negotiate.
///
/// Target info is kept as an unordered map: decoding only needs last-wins
/// lookup by id, so the entry order of the encoded block is not stable
/// between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeMessage {
    pub flags: NegotiateFlags,
    pub session_id: [u8; SESSION_ID_LEN],
    pub server_challenge: [u8; SERVER_CHALLENGE_LEN],
    pub target_info: HashMap<AvId, Vec<u8>>,
}

impl Default for ChallengeMessage {
    fn default() -> Self {
        Self {
            flags: NegotiateFlags::empty(),
            session_id: [0u8; SESSION_ID_LEN],
            server_challenge: [0u8; SERVER_CHALLENGE_LEN],
            target_info: HashMap::new(),
        }
    }
}

impl ChallengeMessage {
    /// Header, flags, session id, server challenge, 8 reserved bytes and the
    /// target-info descriptor.
    pub const FIXED_SIZE: usize =
        Header::SIZE + 4 + SESSION_ID_LEN + SERVER_CHALLENGE_LEN + 8 + VarField::SIZE;

    /// Answer `negotiate` with the given session, challenge and timestamp.
    pub fn for_negotiate(
        negotiate: &NegotiateMessage,
        session_id: [u8; SESSION_ID_LEN],
        server_challenge: [u8; SERVER_CHALLENGE_LEN],
        timestamp: [u8; TIMESTAMP_LEN],
    ) -> Self {
        let mut flags = negotiate.flags;
        flags.insert(NegotiateFlags::UNICODE);

        let mut target_info = HashMap::new();
        target_info.insert(AvId::TIMESTAMP, timestamp.to_vec());

        Self {
            flags,
            session_id,
            server_challenge,
            target_info,
        }
    }

    /// Timestamp entry, if present and well-sized.
    pub fn timestamp(&self) -> Option<[u8; TIMESTAMP_LEN]> {
        self.target_info
            .get(&AvId::TIMESTAMP)
            .and_then(|v| v.as_slice().try_into().ok())
    }

    pub fn marshal(&self) -> Result<Vec<u8>> {
        let raw = encode_target_info(&self.target_info)?;

        let mut next = Self::FIXED_SIZE;
        let target_info = VarField::allocate("target_info", &mut next, raw.len())?;

        let mut buf = Vec::with_capacity(next);
        buf.extend_from_slice(&Header::new(MessageType::Challenge).serialize());
        buf.extend_from_slice(&self.flags.bits().to_le_bytes());
        buf.extend_from_slice(&self.session_id);
        buf.extend_from_slice(&self.server_challenge);
        buf.extend_from_slice(&[0u8; 8]);
        buf.extend_from_slice(&target_info.serialize());
        buf.extend_from_slice(&raw);
        Ok(buf)
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self> {
        Header::deserialize(data, MessageType::Challenge)?;
        let mut reader = FixedReader::after_header(data, Self::FIXED_SIZE)?;

        let flags = NegotiateFlags::from_wire(reader.u32()?);
        let session_id = reader.array::<SESSION_ID_LEN>()?;
        let server_challenge = reader.array::<SERVER_CHALLENGE_LEN>()?;
        reader.skip(8)?;
        let field = reader.var_field()?;

        let target_info = if field.is_empty() {
            HashMap::new()
        } else {
            decode_target_info(field.read_from(data)?)?
        };

        Ok(Self {
            flags,
            session_id,
            server_challenge,
            target_info,
        })
    }
}

/// `(id u16, len u16, value)` entries followed by a bare EOL id. An empty map
/// encodes as an empty block.
fn encode_target_info(entries: &HashMap<AvId, Vec<u8>>) -> Result<Vec<u8>> {
    let mut raw = Vec::new();
    if entries.is_empty() {
        return Ok(raw);
    }
    for (id, value) in entries {
        if *id == AvId::EOL {
            return Err(MessageError::MalformedTargetInfo(
                "entry id 0 is reserved for the terminator".into(),
            ));
        }
        let len = u16::try_from(value.len()).map_err(|_| MessageError::FieldTooLong {
            field: "target_info entry",
            len: value.len(),
        })?;
        raw.extend_from_slice(&id.0.to_le_bytes());
        raw.extend_from_slice(&len.to_le_bytes());
        raw.extend_from_slice(value);
    }
    raw.extend_from_slice(&AvId::EOL.0.to_le_bytes());
    Ok(raw)
}

fn decode_target_info(block: &[u8]) -> Result<HashMap<AvId, Vec<u8>>> {
    let mut entries = HashMap::new();
    let mut offset = 0;

    loop {
        if offset + 2 > block.len() {
            return Err(MessageError::MalformedTargetInfo(
                "block ends without terminator".into(),
            ));
        }
        let id = AvId(u16::from_le_bytes([block[offset], block[offset + 1]]));
        offset += 2;
        if id == AvId::EOL {
            break;
        }

        if offset + 2 > block.len() {
            return Err(MessageError::MalformedTargetInfo(format!(
                "entry {} is missing its length",
                id.0
            )));
        }
        let len = u16::from_le_bytes([block[offset], block[offset + 1]]) as usize;
        offset += 2;

        if offset + len > block.len() {
            return Err(MessageError::MalformedTargetInfo(format!(
                "entry {} declares {} bytes, {} remain",
                id.0,
                len,
                block.len() - offset
            )));
        }
        // Last occurrence of a repeated id wins.
        entries.insert(id, block[offset..offset + len].to_vec());
        offset += len;
    }

    Ok(entries)
}
