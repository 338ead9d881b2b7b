//! # Key Schedule
//!
//! Expands a 128/192/256-bit key into one 32-bit word per round column,
//! 4 * (Nr + 1) words in total.
//!
//! The key arrives as up to four 64-bit words; its byte sequence is the
//! little-endian serialisation of each word in order. Schedule words are
//! built big-endian from that byte sequence, the FIPS-197 convention, so
//! byte 0 of the key lands in row 0 of the first round-key column.

use super::sbox;
use super::KeySize;

/// Round constants, one per full key pass, sitting in the top byte of the
/// schedule word.
const RCON: [u32; 10] = [
    0x0100_0000,
    0x0200_0000,
    0x0400_0000,
    0x0800_0000,
    0x1000_0000,
    0x2000_0000,
    0x4000_0000,
    0x8000_0000,
    0x1b00_0000,
    0x3600_0000,
];

/// Rotate the word's byte sequence one position to the left.
fn rot_word(word: u32) -> u32 {
    word.rotate_left(8)
}

/// Substitute every byte of a schedule word through the S-box.
fn sub_word(word: u32) -> u32 {
    u32::from_be_bytes(word.to_be_bytes().map(sbox::sub))
}

/// Expand `key` into the full round-key schedule for the given key size.
///
/// The schedule is a pure function of its inputs: equal (key, size) pairs
/// always produce identical output.
pub fn expand_key(key: &[u64; 4], size: KeySize) -> Vec<u32> {
    let nk = size.schedule_words();
    let rounds = size.rounds();

    let mut key_bytes = [0u8; 32];
    for (i, word) in key.iter().enumerate() {
        key_bytes[i * 8..i * 8 + 8].copy_from_slice(&word.to_le_bytes());
    }

    let mut w = vec![0u32; 4 * (rounds + 1)];
    for (i, word) in w.iter_mut().take(nk).enumerate() {
        *word = u32::from_be_bytes([
            key_bytes[4 * i],
            key_bytes[4 * i + 1],
            key_bytes[4 * i + 2],
            key_bytes[4 * i + 3],
        ]);
    }

    for i in nk..4 * (rounds + 1) {
        let mut temp = w[i - 1];
        if i % nk == 0 {
            temp = sub_word(rot_word(temp)) ^ RCON[i / nk - 1];
        } else if nk > 6 && i % nk == 4 {
            // The extra substitution pass only exists for 256-bit keys.
            temp = sub_word(temp);
        }
        w[i] = w[i - nk] ^ temp;
    }
    w
}
