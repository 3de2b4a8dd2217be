use hmac::{Hmac, Mac};
use md5::Md5;
use subtle::ConstantTimeEq;

use super::{CryptoError, Result};
use crate::constants::{CLIENT_CHALLENGE_LEN, RESPONSE_BLOB, TIMESTAMP_LEN};

type HmacMd5 = Hmac<Md5>;

/// HMAC-MD5 output length.
pub const HASH_LEN: usize = 16;

/// Blob, reserved, timestamp, client challenge, reserved.
const MATERIAL_LEN: usize = 4 + 4 + TIMESTAMP_LEN + CLIENT_CHALLENGE_LEN + 4;

/// Digest followed by the material it was computed over.
pub const RESPONSE_LEN: usize = HASH_LEN + MATERIAL_LEN;

fn hmac_md5(key: &[u8], parts: &[&[u8]]) -> Result<[u8; HASH_LEN]> {
    let mut mac =
        HmacMd5::new_from_slice(key).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

fn utf16le(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|unit| unit.to_le_bytes()).collect()
}

/// Keyed hash binding a fingerprint to its (user, host, folder) owner.
///
/// The fingerprint string is the HMAC key; the message is the UTF-16LE
/// encoding of `UPPER(user) ++ UPPER(host) ++ folder`.
pub fn create_hash(
    secret: &str,
    user_name: &str,
    host_name: &str,
    folder_name: &str,
) -> Result<[u8; HASH_LEN]> {
    let message = format!(
        "{}{}{}",
        user_name.to_uppercase(),
        host_name.to_uppercase(),
        folder_name
    );
    hmac_md5(secret.as_bytes(), &[&utf16le(&message)])
}

/// Challenge response for `hash`: `HMAC(hash, server ++ material) ++ material`.
pub fn create_response(
    hash: &[u8],
    server_challenge: &[u8],
    client_challenge: &[u8],
    timestamp: &[u8],
) -> Result<Vec<u8>> {
    if client_challenge.len() != CLIENT_CHALLENGE_LEN {
        return Err(CryptoError::InvalidLength {
            field: "client challenge",
            expected: CLIENT_CHALLENGE_LEN,
            got: client_challenge.len(),
        });
    }
    if timestamp.len() != TIMESTAMP_LEN {
        return Err(CryptoError::InvalidLength {
            field: "timestamp",
            expected: TIMESTAMP_LEN,
            got: timestamp.len(),
        });
    }

    let mut material = Vec::with_capacity(MATERIAL_LEN);
    material.extend_from_slice(&RESPONSE_BLOB);
    material.extend_from_slice(&[0u8; 4]);
    material.extend_from_slice(timestamp);
    material.extend_from_slice(client_challenge);
    material.extend_from_slice(&[0u8; 4]);

    let digest = hmac_md5(hash, &[server_challenge, &material])?;

    let mut out = Vec::with_capacity(RESPONSE_LEN);
    out.extend_from_slice(&digest);
    out.extend_from_slice(&material);
    Ok(out)
}

/// Constant-time comparison of two responses.
pub fn responses_match(expected: &[u8], actual: &[u8]) -> bool {
    expected.len() == actual.len() && bool::from(expected.ct_eq(actual))
}
