//! # Error Module
//!
//! Unified error handling for the messenger and the standalone AES tool.

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PalaverError {
    Io(io::Error),
    Crypto(CryptoError),
    Protocol(ProtocolError),
    Network(NetworkError),
    Config(String),
    Argument(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// GCM tag or HMAC mismatch; no plaintext is released
    AuthenticationFailed,
    /// Round count outside {10, 12, 14}
    InvalidRounds(u64),
    InvalidLength { expected: usize, got: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    InvalidTag(u8),
    UnexpectedPacket(String),
    ValueTooLarge(usize),
    MalformedValue(String),
    /// An ERROR-tagged packet was read (peer failure or receive timeout)
    PeerError,
    PeerRefused,
    /// Both peers initiated the same request; one must listen instead
    SimultaneousRequest(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    Timeout,
    NotConnected,
    AcceptTimeout,
    BindFailed(String),
    ConnectFailed(String),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::AuthenticationFailed => {
                write!(f, "authentication failed; refusing to decrypt")
            }
            CryptoError::InvalidRounds(rounds) => {
                write!(f, "invalid round count {} (expected 10, 12, or 14)", rounds)
            }
            CryptoError::InvalidLength { expected, got } => {
                write!(f, "invalid input length: expected at least {}, got {}", expected, got)
            }
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::InvalidTag(value) => write!(f, "unknown packet tag {}", value),
            ProtocolError::UnexpectedPacket(what) => write!(f, "unexpected packet: {}", what),
            ProtocolError::ValueTooLarge(len) => {
                write!(f, "value of {} bytes exceeds the packet size", len)
            }
            ProtocolError::MalformedValue(what) => write!(f, "malformed value: {}", what),
            ProtocolError::PeerError => write!(f, "failed to read from the peer"),
            ProtocolError::PeerRefused => write!(f, "peer refused the request"),
            ProtocolError::SimultaneousRequest(what) => {
                write!(f, "both peers attempted a {}; one peer must listen for requests", what)
            }
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::Timeout => write!(f, "socket operation timed out"),
            NetworkError::NotConnected => write!(f, "no active connection"),
            NetworkError::AcceptTimeout => write!(f, "no client connected before the deadline"),
            NetworkError::BindFailed(why) => write!(f, "failed to bind: {}", why),
            NetworkError::ConnectFailed(why) => write!(f, "failed to connect: {}", why),
        }
    }
}

impl fmt::Display for PalaverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PalaverError::Io(e) => write!(f, "I/O error: {}", e),
            PalaverError::Crypto(e) => write!(f, "crypto error: {}", e),
            PalaverError::Protocol(e) => write!(f, "protocol error: {}", e),
            PalaverError::Network(e) => write!(f, "network error: {}", e),
            PalaverError::Config(msg) => write!(f, "config error: {}", msg),
            PalaverError::Argument(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for PalaverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PalaverError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PalaverError {
    fn from(e: io::Error) -> Self {
        PalaverError::Io(e)
    }
}

impl From<CryptoError> for PalaverError {
    fn from(e: CryptoError) -> Self {
        PalaverError::Crypto(e)
    }
}

impl From<ProtocolError> for PalaverError {
    fn from(e: ProtocolError) -> Self {
        PalaverError::Protocol(e)
    }
}

impl From<NetworkError> for PalaverError {
    fn from(e: NetworkError) -> Self {
        PalaverError::Network(e)
    }
}

pub type Result<T> = std::result::Result<T, PalaverError>;
