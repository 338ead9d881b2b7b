//! # Message Authentication
//!
//! HMAC-SHA-256 over the ciphertext for the unauthenticated modes (ECB and
//! CTR). The hash itself comes from the RustCrypto `hmac`/`sha2` crates;
//! this module only frames the key: the active prefix of the shared key,
//! 2/3/4 words for AES-128/192/256, serialised as little-endian bytes.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::constants::BLOCK_SIZE;
use crate::error::CryptoError;

use super::{constant_time_compare, KeySize};

type HmacSha256 = Hmac<Sha256>;

fn key_bytes(key: &[u64; 4], size: KeySize) -> Vec<u8> {
    key[..size.key_words()]
        .iter()
        .flat_map(|word| word.to_le_bytes())
        .collect()
}

/// Compute the authenticator for `data` under the key prefix selected by
/// the key size.
pub fn message_tag(data: &[u8], key: &[u64; 4], size: KeySize) -> Result<Vec<u8>, CryptoError> {
    let bytes = key_bytes(key, size);
    let mut mac = HmacSha256::new_from_slice(&bytes).map_err(|_| CryptoError::InvalidLength {
        expected: BLOCK_SIZE,
        got: bytes.len(),
    })?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Recompute and compare; any failure verifies as false.
pub fn verify(data: &[u8], key: &[u64; 4], size: KeySize, tag: &[u8]) -> bool {
    match message_tag(data, key, size) {
        Ok(expected) => constant_time_compare(&expected, tag),
        Err(_) => false,
    }
}
