//! # Constants
//!
//! Shared constants for the cipher and the wire protocol.

// ═══════════════════════════════════════════════════════════════════════════
// CIPHER CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// GCM authentication tag size in bytes (one full block)
pub const GCM_TAG_SIZE: usize = 16;

/// Wire nonce size in bytes (a single 64-bit counter seed)
pub const NONCE_SIZE: usize = 8;

/// Number of 64-bit words in a fully built shared key
pub const SHARED_KEY_WORDS: usize = 4;

// ═══════════════════════════════════════════════════════════════════════════
// PACKET CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════

/// Payload size of a single packet
pub const PACKET_SIZE: usize = 1024;

/// On-wire frame size: one tag byte followed by the payload
pub const FRAME_SIZE: usize = PACKET_SIZE + 1;

// ═══════════════════════════════════════════════════════════════════════════
// TIMING CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════

/// Default socket send/receive timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Timeout for waits that involve the peer's user (acknowledgements,
/// re-exchange responses) in seconds
pub const RESPONSE_TIMEOUT_SECS: u64 = 30;

/// Deadline for accepting an incoming connection in seconds
pub const ACCEPT_TIMEOUT_SECS: u64 = 30;
