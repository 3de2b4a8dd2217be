use bitflags::bitflags;

bitflags! {
    /// Negotiated options and optional-field presence bits. Bit positions are
    /// part of the wire format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NegotiateFlags: u32 {
        const UNICODE = 1 << 0;
        const HOSTNAME_SUPPLIED = 1 << 10;
        const USERNAME_SUPPLIED = 1 << 11;
        const FOLDERNAME_SUPPLIED = 1 << 12;
        const TARGET_INFO = 1 << 14;
        const VERSION = 1 << 15;
    }
}

impl NegotiateFlags {
    /// Flags every negotiate message carries.
    pub const DEFAULT: Self = Self::UNICODE
        .union(Self::TARGET_INFO)
        .union(Self::VERSION);

    /// Decode from the wire, keeping bits this build does not name.
    pub fn from_wire(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }
}
