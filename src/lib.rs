//! # palaver - Encrypted Peer-to-Peer Messaging
//!
//! A two-peer messaging tool built on:
//! - A from-scratch AES (128/192/256) in ECB, CTR, and GCM modes
//! - A Diffie-Hellman exchange over freshly synthesised safe primes
//! - A fixed-frame packet protocol over TCP
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── crypto/       # GF arithmetic, key schedule, AES modes, HMAC framing
//! ├── dh/           # Primality, modexp, the key-exchange protocol
//! ├── net/          # Tagged packets and the timed transport
//! ├── session/      # The IDLE/CONNECTED orchestrator
//! ├── cli/          # Interactive menu and terminal output
//! ├── config.rs     # Optional TOML configuration
//! └── error.rs      # Unified error types
//! ```
//!
//! The `palaver` binary drives a session interactively; `palaver-aes`
//! exposes the same cipher behind a file-oriented command line.

pub mod cli;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod dh;
pub mod error;
pub mod net;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use crypto::{KeySize, Mode};
pub use error::{PalaverError, Result};
pub use net::{Packet, Tag};
pub use session::Session;
