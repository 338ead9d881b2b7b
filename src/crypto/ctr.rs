//! # Counter Mode
//!
//! CTR turns the block cipher into a stream: each 16-byte keystream block
//! is the encryption of a counter block, XORed into the message. Counter
//! block `i` carries `nonce + i` little-endian in its first eight bytes and
//! zeros in the rest. Encrypting and decrypting are the same operation.

use crate::constants::{BLOCK_SIZE, NONCE_SIZE};

use super::block::{pad_to_blocks, Block};
use super::cipher::encrypt_block;
use super::key_schedule::expand_key;
use super::KeySize;

/// Build the counter block for a given counter value.
fn counter_block(counter: u64) -> Block {
    let mut block = [0u8; BLOCK_SIZE];
    block[..NONCE_SIZE].copy_from_slice(&counter.to_le_bytes());
    block
}

/// Apply the CTR keystream to `data`. The output is zero-padded to whole
/// blocks, so its length equals the padded input length.
pub fn apply(data: &[u8], key: &[u64; 4], size: KeySize, nonce: u64) -> Vec<u8> {
    let schedule = expand_key(key, size);
    let rounds = size.rounds();

    let mut out = pad_to_blocks(data);
    for (i, chunk) in out.chunks_mut(BLOCK_SIZE).enumerate() {
        let mut pad = counter_block(nonce.wrapping_add(i as u64));
        encrypt_block(&mut pad, &schedule, rounds);
        for (byte, pad_byte) in chunk.iter_mut().zip(pad.iter()) {
            *byte ^= pad_byte;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctr_is_self_inverse() {
        let key = [0xfeed_face, 0xdead_beef, 0xcafe_d00d, 0x0bad_f00d];
        let msg: Vec<u8> = (0u8..48).collect();
        for size in [KeySize::Aes128, KeySize::Aes192, KeySize::Aes256] {
            let cipher = apply(&msg, &key, size, 0x1234_5678_9abc_def0);
            assert_ne!(cipher, msg);
            let plain = apply(&cipher, &key, size, 0x1234_5678_9abc_def0);
            assert_eq!(plain, msg);
        }
    }

    #[test]
    fn different_nonces_give_different_streams() {
        let key = [1, 2, 3, 4];
        let msg = [0u8; 32];
        let a = apply(&msg, &key, KeySize::Aes128, 7);
        let b = apply(&msg, &key, KeySize::Aes128, 8);
        assert_ne!(a, b);
    }

    #[test]
    fn consecutive_blocks_use_consecutive_counters() {
        // Encrypting the second block alone with nonce + 1 must match the
        // second block of a two-block message.
        let key = [9, 9, 9, 9];
        let msg = [0xaau8; 32];
        let whole = apply(&msg, &key, KeySize::Aes128, 100);
        let tail = apply(&msg[16..], &key, KeySize::Aes128, 101);
        assert_eq!(&whole[16..], &tail[..]);
    }

    #[test]
    fn output_is_padded_to_blocks() {
        let key = [5, 6, 7, 8];
        let cipher = apply(b"short", &key, KeySize::Aes128, 42);
        assert_eq!(cipher.len(), 16);
    }
}
