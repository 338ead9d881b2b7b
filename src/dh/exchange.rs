//! # Diffie-Hellman Key Exchange
//!
//! One exchange negotiates a single 64-bit word: the server synthesises a
//! safe prime p = 2q + 1 and a generator g of the order-q subgroup, ships
//! p, g, and its intermediary g^a mod p, and both sides raise the peer's
//! intermediary by their own private exponent. Four independent exchanges
//! build the full 256-bit shared key.
//!
//! The group parameters travel in the clear; only the private exponents
//! stay local. Security rests on the discrete logarithm, scaled down here
//! to 64-bit arithmetic.

use rand::Rng;

use crate::constants::SHARED_KEY_WORDS;
use crate::error::{ProtocolError, Result};
use crate::net::{Tag, Transport};

use super::prime;

/// Which half of the exchange this peer runs. The server generates the
/// group; the client receives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Server,
    Client,
}

/// Intermediary g^k mod p, with the exponent reduced mod (p - 1) first.
/// Fermat's little theorem makes the reduction sound whenever g and p are
/// coprime, which holds for any g the server constructs.
fn intermediary(p: u64, g: u64, k: u64) -> u64 {
    prime::modexp(g, k % (p - 1), p)
}

/// Pick a generator for the order-q subgroup of p: the smallest h >= 1
/// whose lift h^((p-1)/q) mod p exceeds one.
fn find_generator(p: u64, q: u64) -> u64 {
    let exp = (p - 1) / q;
    let mut h = 1u64;
    loop {
        let g = prime::modexp(h, exp, p);
        if g > 1 {
            return g;
        }
        h += 1;
    }
}

/// Run one exchange over an established connection, returning the shared
/// word. The wire order is fixed: p, g, server intermediary, then the
/// client's intermediary coming back.
pub fn exchange_once(conn: &mut Transport, role: Role) -> Result<u64> {
    let k = rand::thread_rng().gen::<u32>() as u64;

    match role {
        Role::Server => {
            let (p, q) = prime::generate_safe_prime();
            let g = find_generator(p, q);
            log::debug!("exchange group: p={} g={}", p, g);

            conn.send_value(p, Tag::Data)?;
            conn.send_value(g, Tag::Data)?;
            conn.send_value(intermediary(p, g, k), Tag::Data)?;

            let theirs: u64 = conn.recv_value()?;
            Ok(prime::modexp(theirs, k, p))
        }
        Role::Client => {
            let p: u64 = conn.recv_value()?;
            let g: u64 = conn.recv_value()?;
            let theirs: u64 = conn.recv_value()?;
            if p < 3 || g < 2 || g >= p {
                return Err(ProtocolError::MalformedValue(format!(
                    "unusable group parameters p={} g={}",
                    p, g
                ))
                .into());
            }
            log::debug!("exchange group: p={} g={}", p, g);

            conn.send_value(intermediary(p, g, k), Tag::Data)?;
            Ok(prime::modexp(theirs, k, p))
        }
    }
}

/// Build the four-word shared key from four back-to-back exchanges.
pub fn build_shared_key(conn: &mut Transport, role: Role) -> Result<[u64; SHARED_KEY_WORDS]> {
    let mut key = [0u64; SHARED_KEY_WORDS];
    for word in key.iter_mut() {
        *word = exchange_once(conn, role)?;
    }
    log::info!("shared key established ({:?} side)", role);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_lies_in_the_subgroup() {
        // h^((p-1)/q) lifted to the subgroup must satisfy g^q = 1 mod p.
        for _ in 0..3 {
            let (p, q) = prime::generate_safe_prime();
            let g = find_generator(p, q);
            assert!(g > 1);
            assert_eq!(prime::modexp(g, q, p), 1);
        }
    }

    #[test]
    fn intermediaries_agree_without_a_network() {
        let (p, q) = prime::generate_safe_prime();
        let g = find_generator(p, q);
        let (a, b) = (123_456_789u64, 987_654_321u64);

        let shared_a = prime::modexp(intermediary(p, g, b), a, p);
        let shared_b = prime::modexp(intermediary(p, g, a), b, p);
        assert_eq!(shared_a, shared_b);
    }

    #[test]
    fn fermat_reduction_matches_direct_exponentiation() {
        let (p, q) = prime::generate_safe_prime();
        let g = find_generator(p, q);
        for k in [1u64, 2, 1_000_003, u32::MAX as u64] {
            assert_eq!(intermediary(p, g, k), prime::modexp(g, k, p));
        }
    }
}
