//! # Galois/Counter Mode
//!
//! CTR encryption authenticated by GHASH, a universal hash over GF(2^128)
//! keyed by the hash subkey H = AES(0^128).
//!
//! The counter seed J0 is derived by running the single-block nonce
//! encoding through GHASH. Standard GCM instead builds J0 from a 96-bit IV
//! directly; both ends of this protocol share the GHASH convention, and the
//! nonce is authenticated implicitly through it. The tag covers the whole
//! ciphertext and spans one full block.

use crate::constants::{BLOCK_SIZE, GCM_TAG_SIZE, NONCE_SIZE};
use crate::error::CryptoError;

use super::block::Block;
use super::cipher::encrypt_block;
use super::gf;
use super::key_schedule::expand_key;
use super::{constant_time_compare, KeySize};

/// Single-block encoding of the 64-bit nonce: little-endian in the first
/// eight bytes, zeros in the rest.
fn nonce_block(nonce: u64) -> Block {
    let mut block = [0u8; BLOCK_SIZE];
    block[..NONCE_SIZE].copy_from_slice(&nonce.to_le_bytes());
    block
}

/// Increment only the low-order 32 bits of the counter block, mod 2^32.
fn inc32(block: &mut Block) {
    let mut counter = u32::from_be_bytes([block[12], block[13], block[14], block[15]]);
    counter = counter.wrapping_add(1);
    block[12..16].copy_from_slice(&counter.to_be_bytes());
}

/// GHASH under subkey `h`: fold each 16-byte chunk of `data` into the
/// accumulator with XOR, multiplying by `h` after every chunk. A final
/// partial chunk is implicitly zero-padded.
fn ghash(data: &[u8], h: &Block) -> Block {
    let mut y = [0u8; BLOCK_SIZE];
    for chunk in data.chunks(BLOCK_SIZE) {
        for (acc, byte) in y.iter_mut().zip(chunk.iter()) {
            *acc ^= byte;
        }
        y = gf::mult_block(&y, h);
    }
    y
}

/// CTR pass with the GCM increment: XOR each chunk of `data` with the
/// encryption of the running counter block, stepping it with `inc32`.
/// A final partial chunk consumes only a prefix of its keystream block.
fn gctr(data: &mut [u8], icb: Block, schedule: &[u32], rounds: usize) {
    let mut counter = icb;
    for chunk in data.chunks_mut(BLOCK_SIZE) {
        let mut pad = counter;
        encrypt_block(&mut pad, schedule, rounds);
        for (byte, pad_byte) in chunk.iter_mut().zip(pad.iter()) {
            *byte ^= pad_byte;
        }
        inc32(&mut counter);
    }
}

/// Encrypt and authenticate. Returns ciphertext ∥ tag; the ciphertext is
/// exactly as long as the plaintext.
pub fn encrypt(plaintext: &[u8], key: &[u64; 4], size: KeySize, nonce: u64) -> Vec<u8> {
    let schedule = expand_key(key, size);
    let rounds = size.rounds();

    let mut h = [0u8; BLOCK_SIZE];
    encrypt_block(&mut h, &schedule, rounds);

    let j0 = ghash(&nonce_block(nonce), &h);

    // The message is encrypted from inc32(J0); J0 itself is reserved for
    // masking the tag, so verification can run before any decryption.
    let mut j = j0;
    inc32(&mut j);

    let mut out = plaintext.to_vec();
    gctr(&mut out, j, &schedule, rounds);

    let mut tag = ghash(&out, &h);
    gctr(&mut tag, j0, &schedule, rounds);

    out.extend_from_slice(&tag);
    out
}

/// Verify and decrypt ciphertext ∥ tag. Fails closed: no plaintext is
/// produced unless the recomputed tag matches.
pub fn decrypt(
    data: &[u8],
    key: &[u64; 4],
    size: KeySize,
    nonce: u64,
) -> Result<Vec<u8>, CryptoError> {
    if data.len() < GCM_TAG_SIZE {
        return Err(CryptoError::InvalidLength {
            expected: GCM_TAG_SIZE,
            got: data.len(),
        });
    }
    let (ciphertext, tag) = data.split_at(data.len() - GCM_TAG_SIZE);

    let schedule = expand_key(key, size);
    let rounds = size.rounds();

    let mut h = [0u8; BLOCK_SIZE];
    encrypt_block(&mut h, &schedule, rounds);

    let j0 = ghash(&nonce_block(nonce), &h);

    let mut expected = ghash(ciphertext, &h);
    gctr(&mut expected, j0, &schedule, rounds);

    if !constant_time_compare(tag, &expected) {
        return Err(CryptoError::AuthenticationFailed);
    }

    let mut j = j0;
    inc32(&mut j);
    let mut out = ciphertext.to_vec();
    gctr(&mut out, j, &schedule, rounds);
    Ok(out)
}
