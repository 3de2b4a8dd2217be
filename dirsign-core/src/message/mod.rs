//! Binary codec for the three protocol messages.
//!
//! Every message opens with a 16-byte [`Header`], continues with fixed-position
//! scalars and [`VarField`] descriptors, and ends with a payload area the
//! descriptors point into. All integers are little-endian.

pub mod varfield;
pub mod flags;
pub mod negotiate;
pub mod challenge;
pub mod authenticate;

pub use authenticate::AuthenticateMessage;
pub use challenge::{AvId, ChallengeMessage};
pub use flags::NegotiateFlags;
pub use negotiate::NegotiateMessage;
pub use varfield::VarField;

use thiserror::Error;

use crate::constants::SIGNATURE;

/// Errors from encoding or decoding a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error("Invalid message signature")]
    InvalidSignature,
    #[error("Unexpected message type: expected {expected}, got {got}")]
    UnexpectedMessageType { expected: u32, got: u32 },
    #[error("Insufficient data: need {need} bytes, got {got}")]
    InsufficientData { need: usize, got: usize },
    #[error("Field at offset {offset} with length {len} extends beyond buffer of {buffer_len} bytes")]
    FieldOutOfBounds {
        offset: u32,
        len: u16,
        buffer_len: usize,
    },
    #[error("Malformed target info: {0}")]
    MalformedTargetInfo(String),
    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("Field {field} too long: {len} bytes")]
    FieldTooLong { field: &'static str, len: usize },
    #[error("Required flag not negotiated: {0}")]
    MissingFlag(&'static str),
}

impl MessageError {
    /// True for a missing protocol flag, false for every validation failure.
    pub fn is_flag_error(&self) -> bool {
        matches!(self, MessageError::MissingFlag(_))
    }
}

/// Convenience alias for codec operations.
pub type Result<T> = std::result::Result<T, MessageError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MessageType {
    Negotiate = 1,
    Challenge = 2,
    Authenticate = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub message_type: MessageType,
}

impl Header {
    pub const SIZE: usize = 16;

    pub fn new(message_type: MessageType) -> Self {
        Self { message_type }
    }

    pub fn serialize(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..8].copy_from_slice(&SIGNATURE);
        buf[8..12].copy_from_slice(&(self.message_type as u32).to_le_bytes());
        // 12..16 reserved
        buf
    }

    /// Parse the header and require it to announce `expected`.
    pub fn deserialize(data: &[u8], expected: MessageType) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(MessageError::InsufficientData {
                need: Self::SIZE,
                got: data.len(),
            });
        }

        if data[0..8] != SIGNATURE {
            return Err(MessageError::InvalidSignature);
        }

        let got = u32::from_le_bytes([data[8], data[9], data[10], data[11]]);
        if got != expected as u32 {
            return Err(MessageError::UnexpectedMessageType {
                expected: expected as u32,
                got,
            });
        }

        Ok(Self {
            message_type: expected,
        })
    }
}

/// Protocol version sub-record carried by negotiate messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub build: u16,
    pub revision: u8,
}

impl Version {
    pub const SIZE: usize = 8;

    pub fn serialize(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0] = self.major;
        buf[1] = self.minor;
        buf[2..4].copy_from_slice(&self.build.to_le_bytes());
        // 4..7 reserved
        buf[7] = self.revision;
        buf
    }

    pub fn deserialize(data: &[u8; Self::SIZE]) -> Self {
        Self {
            major: data[0],
            minor: data[1],
            build: u16::from_le_bytes([data[2], data[3]]),
            revision: data[7],
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Self {
            major: 1,
            minor: 0,
            build: 1,
            revision: 15,
        }
    }
}

/// Sequential reader over the fixed part of a message whose length was
/// already checked against the layout size.
pub(crate) struct FixedReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FixedReader<'a> {
    /// Start reading right after the header, requiring `fixed_size` bytes.
    pub(crate) fn after_header(data: &'a [u8], fixed_size: usize) -> Result<Self> {
        if data.len() < fixed_size {
            return Err(MessageError::InsufficientData {
                need: fixed_size,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            pos: Header::SIZE,
        })
    }

    pub(crate) fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self.pos + N;
        if end > self.data.len() {
            return Err(MessageError::InsufficientData {
                need: end,
                got: self.data.len(),
            });
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(out)
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array::<4>()?))
    }

    pub(crate) fn var_field(&mut self) -> Result<VarField> {
        Ok(VarField::deserialize(&self.array::<{ VarField::SIZE }>()?))
    }

    pub(crate) fn skip(&mut self, n: usize) -> Result<()> {
        let end = self.pos + n;
        if end > self.data.len() {
            return Err(MessageError::InsufficientData {
                need: end,
                got: self.data.len(),
            });
        }
        self.pos = end;
        Ok(())
    }
}
