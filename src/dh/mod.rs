//! # Diffie-Hellman Module
//!
//! Safe-prime synthesis, modular exponentiation, and the key-exchange
//! protocol that turns four round trips into a 256-bit shared key.

pub mod exchange;
pub mod prime;

pub use exchange::{build_shared_key, Role};
