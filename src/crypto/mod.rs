//! # Cryptographic Module
//!
//! A from-scratch AES (128/192/256) in three modes of operation, built on
//! explicit GF(2^8) field arithmetic, plus the HMAC framing used by the
//! unauthenticated modes.
//!
//! NOTE: This is an educational implementation. It is not hardened against
//! side channels and must not guard anything of value.

pub mod block;
pub mod cipher;
pub mod ctr;
pub mod gcm;
pub mod gf;
pub mod key_schedule;
pub mod mac;
pub mod sbox;

use std::fmt;

use crate::error::CryptoError;

/// Key size variant, fixing the round count and how much of the four-word
/// shared key is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySize {
    Aes128,
    Aes192,
    Aes256,
}

impl KeySize {
    pub fn bits(self) -> usize {
        match self {
            KeySize::Aes128 => 128,
            KeySize::Aes192 => 192,
            KeySize::Aes256 => 256,
        }
    }

    /// Number of cipher rounds (Nr).
    pub fn rounds(self) -> usize {
        match self {
            KeySize::Aes128 => 10,
            KeySize::Aes192 => 12,
            KeySize::Aes256 => 14,
        }
    }

    /// Active 64-bit words of the shared key.
    pub fn key_words(self) -> usize {
        match self {
            KeySize::Aes128 => 2,
            KeySize::Aes192 => 3,
            KeySize::Aes256 => 4,
        }
    }

    /// 32-bit words fed to the key schedule (Nk).
    pub fn schedule_words(self) -> usize {
        match self {
            KeySize::Aes128 => 4,
            KeySize::Aes192 => 6,
            KeySize::Aes256 => 8,
        }
    }

    /// Recover the key size from a round count received off the wire.
    /// Anything outside {10, 12, 14} is a hard error.
    pub fn from_rounds(rounds: u64) -> Result<Self, CryptoError> {
        match rounds {
            10 => Ok(KeySize::Aes128),
            12 => Ok(KeySize::Aes192),
            14 => Ok(KeySize::Aes256),
            other => Err(CryptoError::InvalidRounds(other)),
        }
    }
}

impl fmt::Display for KeySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AES-{}", self.bits())
    }
}

/// Mode of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Ecb,
    Ctr,
    Gcm,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Ecb => "ECB",
            Mode::Ctr => "CTR",
            Mode::Gcm => "GCM",
        };
        write!(f, "{}", name)
    }
}

/// Constant-time comparison for tags and authenticators.
#[inline(never)]
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Round-trip a short message through every mode and key size. Run once at
/// start-up so a miscompiled cipher is caught before any traffic.
pub fn self_test() -> bool {
    let key = [0x0123_4567_89ab_cdef, 0xfedc_ba98_7654_3210, 0x1111, 0x2222];
    let msg = b"cipher self-test message";
    let nonce = 0x5eed_cafe;

    for size in [KeySize::Aes128, KeySize::Aes192, KeySize::Aes256] {
        let padded = block::pad_to_blocks(msg);
        if cipher::ecb_decrypt(&cipher::ecb_encrypt(msg, &key, size), &key, size) != padded {
            return false;
        }
        if ctr::apply(&ctr::apply(msg, &key, size, nonce), &key, size, nonce) != padded {
            return false;
        }
        match gcm::decrypt(&gcm::encrypt(msg, &key, size, nonce), &key, size, nonce) {
            Ok(plain) if plain == msg => {}
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_map_both_ways() {
        for size in [KeySize::Aes128, KeySize::Aes192, KeySize::Aes256] {
            assert_eq!(KeySize::from_rounds(size.rounds() as u64), Ok(size));
        }
        assert_eq!(KeySize::from_rounds(11), Err(CryptoError::InvalidRounds(11)));
        assert_eq!(KeySize::from_rounds(0), Err(CryptoError::InvalidRounds(0)));
    }

    #[test]
    fn compare_rejects_length_mismatch() {
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 3, 4]));
        assert!(constant_time_compare(&[1, 2, 3], &[1, 2, 3]));
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 4]));
    }

    #[test]
    fn self_test_passes() {
        assert!(self_test());
    }
}
