//! Process-unique identifiers.
//!
//! A random 24-byte seed is drawn once; each id is the seed with its first
//! eight bytes replaced by an atomically incremented counter. Unique within
//! one generator, random across generators.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::constants::SESSION_ID_LEN;
use crate::error::Result;
use crate::traits::SecureRandom;

#[derive(Debug)]
pub struct IdentityGenerator {
    seed: [u8; SESSION_ID_LEN],
    counter: AtomicU64,
}

impl IdentityGenerator {
    /// Draw a fresh seed from `rng`.
    pub fn new(rng: &dyn SecureRandom) -> Result<Self> {
        let mut seed = [0u8; SESSION_ID_LEN];
        rng.fill_bytes(&mut seed)?;
        Ok(Self::with_seed(seed))
    }

    pub fn with_seed(seed: [u8; SESSION_ID_LEN]) -> Self {
        let mut low = [0u8; 8];
        low.copy_from_slice(&seed[..8]);
        Self {
            seed,
            counter: AtomicU64::new(u64::from_le_bytes(low)),
        }
    }

    pub fn next(&self) -> [u8; SESSION_ID_LEN] {
        let n = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let mut id = self.seed;
        id[..8].copy_from_slice(&n.to_le_bytes());
        id
    }

    /// Next id as a dashed, version-4 style string.
    pub fn next_hex128(&self) -> String {
        hex128(self.next())
    }

    /// Next id as 48 lowercase hex characters.
    pub fn next_hex(&self) -> String {
        hex::encode(self.next())
    }
}

/// Format the first 16 bytes of `id` as `8-4-4-4-12` lowercase hex with the
/// version nibble set to 4 and the variant bits to `10`.
pub fn hex128(mut id: [u8; SESSION_ID_LEN]) -> String {
    id.swap(6, 9);
    id[6] = (id[6] & 0x0f) | 0x40;
    id[8] = (id[8] & 0x3f) | 0x80;

    format!(
        "{}-{}-{}-{}-{}",
        hex::encode(&id[0..4]),
        hex::encode(&id[4..6]),
        hex::encode(&id[6..8]),
        hex::encode(&id[8..10]),
        hex::encode(&id[10..16])
    )
}

/// Syntax check only: length, dash positions and lowercase hex digits.
pub fn is_valid_hex128(id: &str) -> bool {
    let bytes = id.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, &c)| match i {
        8 | 13 | 18 | 23 => c == b'-',
        _ => c.is_ascii_digit() || (b'a'..=b'f').contains(&c),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_counter_starts_from_seed() {
        let mut seed = [0xEEu8; 24];
        seed[..8].copy_from_slice(&41u64.to_le_bytes());
        let gen = IdentityGenerator::with_seed(seed);

        let id = gen.next();
        assert_eq!(&id[..8], &42u64.to_le_bytes());
        assert_eq!(&id[8..], &[0xEE; 16]);
        assert_eq!(&gen.next()[..8], &43u64.to_le_bytes());
    }

    #[test]
    fn test_counter_wraps() {
        let mut seed = [0u8; 24];
        seed[..8].copy_from_slice(&u64::MAX.to_le_bytes());
        let gen = IdentityGenerator::with_seed(seed);
        assert_eq!(&gen.next()[..8], &0u64.to_le_bytes());
    }

    #[test]
    fn test_unique_across_threads() {
        let gen = Arc::new(IdentityGenerator::with_seed([7; 24]));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gen = Arc::clone(&gen);
                std::thread::spawn(move || (0..500).map(|_| gen.next_hex()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 4000);
    }

    #[test]
    fn test_hex128_format() {
        let mut id = [0u8; 24];
        for (i, b) in id.iter_mut().enumerate() {
            *b = i as u8;
        }
        // bytes 6 and 9 swapped, then version and variant applied
        assert_eq!(hex128(id), "00010203-0405-4907-8806-0a0b0c0d0e0f");
    }

    #[test]
    fn test_generated_hex128_is_valid() {
        let gen = IdentityGenerator::with_seed([0xAB; 24]);
        for _ in 0..100 {
            let id = gen.next_hex128();
            assert!(is_valid_hex128(&id), "{id}");
            assert_eq!(&id[14..15], "4");
        }
    }

    #[test]
    fn test_validator_rejects() {
        assert!(is_valid_hex128("00010203-0405-4907-8806-0a0b0c0d0e0f"));
        assert!(!is_valid_hex128("00010203-0405-4907-8806-0a0b0c0d0e0"));
        assert!(!is_valid_hex128("00010203-0405-4907-8806-0A0B0C0D0E0F"));
        assert!(!is_valid_hex128("0001020300405-4907-8806-0a0b0c0d0e0f"));
        assert!(!is_valid_hex128("00010203-0405-4907-8806-0a0b0c0d0e0g"));
    }

    #[test]
    fn test_next_hex_length() {
        let gen = IdentityGenerator::with_seed([1; 24]);
        assert_eq!(gen.next_hex().len(), 48);
    }
}
