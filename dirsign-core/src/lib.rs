//! Folder signing over an NTLM-style challenge-response exchange.
//!
//! The codec, response crypto, fingerprinting and protocol flows live here so
//! that the CLI and the server share identical byte-level behavior.

pub mod error;
pub mod constants;
pub mod traits;
pub mod platform;
pub mod message;
pub mod crypto;
pub mod fingerprint;
pub mod identity;
pub mod record;
pub mod store;
pub mod protocol;
