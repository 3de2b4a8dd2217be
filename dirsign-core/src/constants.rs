/// Signature opening every message header.
pub const SIGNATURE: [u8; 8] = *b"DIRSIGN\0";

/// Client challenge length in bytes.
pub const CLIENT_CHALLENGE_LEN: usize = 64;

/// Server challenge length in bytes.
pub const SERVER_CHALLENGE_LEN: usize = 64;

/// Timestamp length in bytes (FILETIME, little-endian).
pub const TIMESTAMP_LEN: usize = 8;

/// Session identifier length in bytes.
pub const SESSION_ID_LEN: usize = 24;

/// Offset between 1601-01-01 and 1970-01-01 in 100ns ticks.
pub const FILETIME_UNIX_EPOCH: u64 = 116_444_736_000_000_000;

/// Leading constant of the response material block.
pub const RESPONSE_BLOB: [u8; 4] = [1, 1, 0, 0];

/// Registration endpoint.
pub const API_CHALLENGE: &str = "/v1/api/challenge";
/// Verification endpoint.
pub const API_RETRIEVE: &str = "/v1/api/retrieve/";

/// Default client-side record file, kept inside the signed folder.
pub const CLIENT_STORE_FILE: &str = "dirsign.store";
/// Server-side store file, kept inside the configured store directory.
pub const SERVER_STORE_FILE: &str = "dirsign.server.store";

/// Prefix of every fingerprint string.
pub const FINGERPRINT_PREFIX: &str = "h1:";
