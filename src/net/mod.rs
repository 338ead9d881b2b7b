//! # Network Module
//!
//! Fixed-size tagged packets and the timed transport that carries them.

pub mod packet;
pub mod transport;

pub use packet::{Packet, Tag};
pub use transport::{Listener, Transport};
