use super::{MessageError, Result};

/// Descriptor of a variable-size segment in the payload area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VarField {
    pub len: u16,
    pub max_len: u16,
    pub offset: u32,
}

impl VarField {
    pub const SIZE: usize = 8;

    /// Describe a field of `size` bytes at `*next_offset` and advance the
    /// running offset past it. Fields must be allocated in payload order.
    pub fn allocate(field: &'static str, next_offset: &mut usize, size: usize) -> Result<Self> {
        let len = u16::try_from(size).map_err(|_| MessageError::FieldTooLong { field, len: size })?;
        let offset = u32::try_from(*next_offset)
            .map_err(|_| MessageError::FieldTooLong { field, len: *next_offset })?;
        *next_offset += size;
        Ok(Self {
            len,
            max_len: len,
            offset,
        })
    }

    pub fn serialize(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..2].copy_from_slice(&self.len.to_le_bytes());
        buf[2..4].copy_from_slice(&self.max_len.to_le_bytes());
        buf[4..8].copy_from_slice(&self.offset.to_le_bytes());
        buf
    }

    pub fn deserialize(data: &[u8; Self::SIZE]) -> Self {
        Self {
            len: u16::from_le_bytes([data[0], data[1]]),
            max_len: u16::from_le_bytes([data[2], data[3]]),
            offset: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slice the described segment out of the whole message buffer.
    pub fn read_from<'a>(&self, buffer: &'a [u8]) -> Result<&'a [u8]> {
        let start = self.offset as usize;
        let end = start + self.len as usize;
        if end > buffer.len() {
            return Err(MessageError::FieldOutOfBounds {
                offset: self.offset,
                len: self.len,
                buffer_len: buffer.len(),
            });
        }
        Ok(&buffer[start..end])
    }

    /// Like [`read_from`](Self::read_from), decoding the segment as UTF-8.
    /// Empty descriptors yield an empty string without touching the buffer.
    pub fn read_string_from(&self, field: &'static str, buffer: &[u8]) -> Result<String> {
        if self.is_empty() {
            return Ok(String::new());
        }
        let bytes = self.read_from(buffer)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| MessageError::InvalidField {
            field,
            reason: e.to_string(),
        })
    }

    /// Like [`read_from`](Self::read_from), copying the segment.
    pub fn read_bytes_from(&self, buffer: &[u8]) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.read_from(buffer)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_advances_offset() {
        let mut next = 64;
        let a = VarField::allocate("a", &mut next, 5).unwrap();
        let b = VarField::allocate("b", &mut next, 0).unwrap();
        let c = VarField::allocate("c", &mut next, 3).unwrap();

        assert_eq!((a.offset, a.len, a.max_len), (64, 5, 5));
        assert_eq!((b.offset, b.len), (69, 0));
        assert_eq!((c.offset, c.len), (69, 3));
        assert_eq!(next, 72);
    }

    #[test]
    fn test_allocate_rejects_oversized_field() {
        let mut next = 0;
        let result = VarField::allocate("big", &mut next, 70_000);
        assert_eq!(
            result,
            Err(MessageError::FieldTooLong { field: "big", len: 70_000 })
        );
        assert_eq!(next, 0);
    }

    #[test]
    fn test_serialize_layout() {
        let f = VarField {
            len: 0x0102,
            max_len: 0x0304,
            offset: 0x0506_0708,
        };
        let bytes = f.serialize();
        assert_eq!(bytes, [0x02, 0x01, 0x04, 0x03, 0x08, 0x07, 0x06, 0x05]);
        assert_eq!(VarField::deserialize(&bytes), f);
    }

    #[test]
    fn test_read_from_within_bounds() {
        let buffer = b"headerPAYLOAD";
        let f = VarField { len: 7, max_len: 7, offset: 6 };
        assert_eq!(f.read_from(buffer).unwrap(), b"PAYLOAD");
    }

    #[test]
    fn test_read_from_past_end_fails() {
        let buffer = [0u8; 10];
        let f = VarField { len: 5, max_len: 5, offset: 8 };
        assert_eq!(
            f.read_from(&buffer),
            Err(MessageError::FieldOutOfBounds {
                offset: 8,
                len: 5,
                buffer_len: 10
            })
        );
    }

    #[test]
    fn test_read_string_rejects_invalid_utf8() {
        let buffer = [0xFF, 0xFE];
        let f = VarField { len: 2, max_len: 2, offset: 0 };
        assert!(matches!(
            f.read_string_from("user", &buffer),
            Err(MessageError::InvalidField { field: "user", .. })
        ));
    }
}
