//! # Block Cipher and ECB
//!
//! The AES round structure over a single block, and the electronic code
//! book mode that applies it block-wise to a zero-padded message.

use crate::constants::BLOCK_SIZE;

use super::block::{self, Block};
use super::key_schedule::expand_key;
use super::KeySize;

/// Encrypt one block in place under an expanded schedule.
pub fn encrypt_block(state: &mut Block, schedule: &[u32], rounds: usize) {
    block::add_round_key(state, schedule, 0);

    for round in 1..rounds {
        block::sub_bytes(state);
        block::shift_rows(state);
        block::mix_columns(state);
        block::add_round_key(state, schedule, round);
    }

    // The final round skips the column mix.
    block::sub_bytes(state);
    block::shift_rows(state);
    block::add_round_key(state, schedule, rounds);
}

/// Decrypt one block in place, running the rounds backwards. AddRoundKey is
/// its own inverse, so only the other three steps need dedicated inverses.
pub fn decrypt_block(state: &mut Block, schedule: &[u32], rounds: usize) {
    block::add_round_key(state, schedule, rounds);

    for round in (1..rounds).rev() {
        block::inv_shift_rows(state);
        block::inv_sub_bytes(state);
        block::add_round_key(state, schedule, round);
        block::inv_mix_columns(state);
    }

    block::inv_shift_rows(state);
    block::inv_sub_bytes(state);
    block::add_round_key(state, schedule, 0);
}

/// ECB encryption: zero-pad to whole blocks and encrypt each independently.
pub fn ecb_encrypt(plaintext: &[u8], key: &[u64; 4], size: KeySize) -> Vec<u8> {
    let schedule = expand_key(key, size);
    let rounds = size.rounds();
    let mut out = block::pad_to_blocks(plaintext);
    for chunk in out.chunks_mut(BLOCK_SIZE) {
        let mut state = [0u8; BLOCK_SIZE];
        state.copy_from_slice(chunk);
        encrypt_block(&mut state, &schedule, rounds);
        chunk.copy_from_slice(&state);
    }
    out
}

/// ECB decryption. The result is the padded plaintext; callers that framed
/// the original length are responsible for trimming.
pub fn ecb_decrypt(ciphertext: &[u8], key: &[u64; 4], size: KeySize) -> Vec<u8> {
    let schedule = expand_key(key, size);
    let rounds = size.rounds();
    let mut out = block::pad_to_blocks(ciphertext);
    for chunk in out.chunks_mut(BLOCK_SIZE) {
        let mut state = [0u8; BLOCK_SIZE];
        state.copy_from_slice(chunk);
        decrypt_block(&mut state, &schedule, rounds);
        chunk.copy_from_slice(&state);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // NIST SP 800-38A single-block plaintext, shared by all three key sizes.
    const PLAIN: [u8; 16] = [
        0x6b, 0xc1, 0xbe, 0xe2, 0x2e, 0x40, 0x9f, 0x96, 0xe9, 0x3d, 0x7e, 0x11, 0x73, 0x93, 0x17,
        0x2a,
    ];

    fn key_from_bytes(bytes: &[u8]) -> [u64; 4] {
        let mut key = [0u64; 4];
        for (i, chunk) in bytes.chunks(8).enumerate() {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            key[i] = u64::from_le_bytes(word);
        }
        key
    }

    #[test]
    fn aes128_ecb_vector() {
        let key = key_from_bytes(&[
            0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf,
            0x4f, 0x3c,
        ]);
        let expected = [
            0x3a, 0xd7, 0x7b, 0xb4, 0x0d, 0x7a, 0x36, 0x60, 0xa8, 0x9e, 0xca, 0xf3, 0x24, 0x66,
            0xef, 0x97,
        ];
        assert_eq!(ecb_encrypt(&PLAIN, &key, KeySize::Aes128), expected);
        assert_eq!(ecb_decrypt(&expected, &key, KeySize::Aes128), PLAIN);
    }

    #[test]
    fn aes192_ecb_vector() {
        let key = key_from_bytes(&[
            0x8e, 0x73, 0xb0, 0xf7, 0xda, 0x0e, 0x64, 0x52, 0xc8, 0x10, 0xf3, 0x2b, 0x80, 0x90,
            0x79, 0xe5, 0x62, 0xf8, 0xea, 0xd2, 0x52, 0x2c, 0x6b, 0x7b,
        ]);
        let expected = [
            0xbd, 0x33, 0x4f, 0x1d, 0x6e, 0x45, 0xf2, 0x5f, 0xf7, 0x12, 0xa2, 0x14, 0x57, 0x1f,
            0xa5, 0xcc,
        ];
        assert_eq!(ecb_encrypt(&PLAIN, &key, KeySize::Aes192), expected);
        assert_eq!(ecb_decrypt(&expected, &key, KeySize::Aes192), PLAIN);
    }

    #[test]
    fn aes256_ecb_vector() {
        let key = key_from_bytes(&[
            0x60, 0x3d, 0xeb, 0x10, 0x15, 0xca, 0x71, 0xbe, 0x2b, 0x73, 0xae, 0xf0, 0x85, 0x7d,
            0x77, 0x81, 0x1f, 0x35, 0x2c, 0x07, 0x3b, 0x61, 0x08, 0xd7, 0x2d, 0x98, 0x10, 0xa3,
            0x09, 0x14, 0xdf, 0xf4,
        ]);
        let expected = [
            0xf3, 0xee, 0xd1, 0xbd, 0xb5, 0xd2, 0xa0, 0x3c, 0x06, 0x4b, 0x5a, 0x7e, 0x3d, 0xb1,
            0x81, 0xf8,
        ];
        assert_eq!(ecb_encrypt(&PLAIN, &key, KeySize::Aes256), expected);
        assert_eq!(ecb_decrypt(&expected, &key, KeySize::Aes256), PLAIN);
    }

    #[test]
    fn multi_block_round_trip_pads_with_zeros() {
        let key = [0x1111, 0x2222, 0x3333, 0x4444];
        let msg = b"a message that is longer than one block";
        for size in [KeySize::Aes128, KeySize::Aes192, KeySize::Aes256] {
            let cipher = ecb_encrypt(msg, &key, size);
            assert_eq!(cipher.len() % 16, 0);
            let plain = ecb_decrypt(&cipher, &key, size);
            assert_eq!(&plain[..msg.len()], msg);
            assert!(plain[msg.len()..].iter().all(|&b| b == 0));
        }
    }
}
