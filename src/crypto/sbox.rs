//! # S-box
//!
//! The AES substitution box, derived rather than transcribed: each entry is
//! the GF(2^8) inverse of the byte pushed through an affine transformation
//! with constant 0x63. The inverse box undoes the affine step first
//! (a rotate-XOR form with constant 0x05) and then inverts in the field.
//!
//! The derivation runs once per table; lookups after that are plain
//! indexing.

use std::sync::OnceLock;

use super::gf;

/// Affine step of the forward S-box: each output bit is the XOR of five
/// input bits and one constant bit, r_k = i_k ^ i_{k+4} ^ i_{k+5} ^ i_{k+6}
/// ^ i_{k+7} ^ c_k with c = 0x63 (indices mod 8).
fn affine(i: u8) -> u8 {
    let mut r = 0u8;
    for k in 0..8 {
        let bit = (i >> k)
            ^ (i >> ((k + 4) % 8))
            ^ (i >> ((k + 5) % 8))
            ^ (i >> ((k + 6) % 8))
            ^ (i >> ((k + 7) % 8))
            ^ (0x63 >> k);
        r |= (bit & 1) << k;
    }
    r
}

/// Inverse affine step, in its compact rotate form.
fn inv_affine(b: u8) -> u8 {
    b.rotate_left(1) ^ b.rotate_left(3) ^ b.rotate_left(6) ^ 0x05
}

/// Forward substitution.
pub fn sub(byte: u8) -> u8 {
    static TABLE: OnceLock<[u8; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0u8; 256];
        for (b, entry) in table.iter_mut().enumerate() {
            *entry = affine(gf::inverse(b as u8));
        }
        table
    })[byte as usize]
}

/// Inverse substitution.
pub fn inv_sub(byte: u8) -> u8 {
    static TABLE: OnceLock<[u8; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0u8; 256];
        for (b, entry) in table.iter_mut().enumerate() {
            *entry = gf::inverse(inv_affine(b as u8));
        }
        table
    })[byte as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_entries() {
        // Spot checks against the FIPS-197 table.
        assert_eq!(sub(0x00), 0x63);
        assert_eq!(sub(0x01), 0x7c);
        assert_eq!(sub(0x53), 0xed);
        assert_eq!(sub(0xff), 0x16);
        assert_eq!(inv_sub(0x63), 0x00);
        assert_eq!(inv_sub(0xed), 0x53);
    }

    #[test]
    fn boxes_are_inverses() {
        for b in 0..=255u8 {
            assert_eq!(inv_sub(sub(b)), b);
            assert_eq!(sub(inv_sub(b)), b);
        }
    }

    #[test]
    fn substitution_has_no_fixed_points() {
        for b in 0..=255u8 {
            assert_ne!(sub(b), b);
        }
    }
}
