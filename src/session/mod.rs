//! # Session Orchestrator
//!
//! The IDLE/CONNECTED state machine behind the interactive tool. A session
//! owns its sockets and the four-word shared key; every user action maps to
//! one method here, and the sub-protocols (message transfer, re-exchange)
//! run start to finish inside a single call.
//!
//! Errors from the peer or from timeouts leave the state untouched; only
//! `terminate` transitions back to IDLE, and it does so unconditionally,
//! zeroing the shared key on the way.

use std::fmt;
use std::time::Duration;

use zeroize::Zeroize;

use crate::config::Config;
use crate::constants::SHARED_KEY_WORDS;
use crate::crypto::{cipher, ctr, gcm, mac, KeySize, Mode};
use crate::dh::{build_shared_key, Role};
use crate::error::{CryptoError, NetworkError, ProtocolError, Result};
use crate::net::{Listener, Packet, Tag, Transport};

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Connected,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Idle => write!(f, "IDLE"),
            State::Connected => write!(f, "CONNECTED"),
        }
    }
}

/// A request the peer has initiated, awaiting local acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerRequest {
    Reexchange,
    Message,
}

/// How a locally initiated re-exchange concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReexchangeOutcome {
    Completed,
    Refused,
}

/// A decrypted incoming message together with how it was protected.
#[derive(Debug)]
pub struct IncomingMessage {
    pub plaintext: Vec<u8>,
    pub size: KeySize,
    pub mode: Mode,
}

pub struct Session {
    state: State,
    listener: Option<Listener>,
    conn: Option<Transport>,
    shared_key: [u64; SHARED_KEY_WORDS],
    io_timeout: Duration,
    response_timeout: Duration,
    accept_timeout: Duration,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Session {
            state: State::Idle,
            listener: None,
            conn: None,
            shared_key: [0; SHARED_KEY_WORDS],
            io_timeout: Duration::from_secs(config.timeouts.io),
            response_timeout: Duration::from_secs(config.timeouts.response),
            accept_timeout: Duration::from_secs(config.timeouts.accept),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Whether the listening socket already exists (it is bound once and
    /// reused, so the port is only asked for on the first listen).
    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    pub fn listener_port(&self) -> Option<u16> {
        self.listener.as_ref().map(Listener::port)
    }

    pub fn shared_key(&self) -> [u64; SHARED_KEY_WORDS] {
        self.shared_key
    }

    /// The shared key reduced mod 100 per word, for out-of-band comparison
    /// between the peers.
    pub fn key_digits(&self) -> [u64; SHARED_KEY_WORDS] {
        self.shared_key.map(|word| word % 100)
    }

    fn conn_mut(&mut self) -> Result<&mut Transport> {
        self.conn
            .as_mut()
            .ok_or_else(|| NetworkError::NotConnected.into())
    }

    /// Open a connection to a listening peer and run the client side of the
    /// four-round exchange. The socket is released if the exchange fails.
    pub fn initialize(&mut self, host: &str, port: u16) -> Result<()> {
        let mut conn = Transport::connect(host, port, self.io_timeout)?;
        let key = build_shared_key(&mut conn, Role::Client)?;
        self.shared_key = key;
        self.conn = Some(conn);
        self.state = State::Connected;
        Ok(())
    }

    /// Wait for a peer to connect and run the server side of the exchange.
    /// The listening socket is bound on the first call and kept for the
    /// process lifetime; `port` is ignored once it exists.
    pub fn listen(&mut self, port: u16) -> Result<()> {
        if self.listener.is_none() {
            self.listener = Some(Listener::bind(port)?);
        }
        let mut conn = self
            .listener
            .as_ref()
            .ok_or(NetworkError::NotConnected)?
            .accept(self.accept_timeout, self.io_timeout)?;

        let key = build_shared_key(&mut conn, Role::Server)?;
        self.shared_key = key;
        self.conn = Some(conn);
        self.state = State::Connected;
        Ok(())
    }

    /// Block until the peer initiates something, classifying the request.
    /// The caller decides whether to acknowledge and then completes the
    /// exchange with `accept_reexchange`, `accept_message`, or `refuse`.
    pub fn await_request(&mut self) -> Result<PeerRequest> {
        let timeout = self.response_timeout;
        let conn = self.conn_mut()?;
        let packet = conn.recv_packet(timeout);
        match packet.tag {
            Tag::Reexchange => Ok(PeerRequest::Reexchange),
            Tag::Message => Ok(PeerRequest::Message),
            Tag::Error => Err(ProtocolError::PeerError.into()),
            tag => Err(ProtocolError::UnexpectedPacket(format!("unsolicited {} packet", tag)).into()),
        }
    }

    /// Acknowledge a pending request and run the server side of a fresh
    /// exchange, overwriting the shared key.
    pub fn accept_reexchange(&mut self) -> Result<()> {
        let io = self.io_timeout;
        let conn = self.conn_mut()?;
        conn.send_packet(&Packet::new(Tag::Ack), io)?;
        let key = build_shared_key(conn, Role::Server)?;
        self.shared_key = key;
        Ok(())
    }

    /// Acknowledge a pending message request and run the receive
    /// sub-protocol: round count, ciphertext, nonce packet, and the HMAC
    /// for the unauthenticated modes. Authentication failures abort before
    /// any plaintext exists.
    pub fn accept_message(&mut self) -> Result<IncomingMessage> {
        let key = self.shared_key;
        let io = self.io_timeout;
        let conn = self.conn_mut()?;

        conn.send_packet(&Packet::new(Tag::Ack), io)?;

        let rounds: u64 = conn.recv_value()?;
        let size = KeySize::from_rounds(rounds)?;
        let ciphertext = conn.recv_string()?;

        let nonce_packet = conn.recv_packet(io);
        match nonce_packet.tag {
            Tag::Iv => {
                let nonce: u64 = nonce_packet.parse()?;
                let plaintext = gcm::decrypt(&ciphertext, &key, size, nonce)?;
                Ok(IncomingMessage {
                    plaintext,
                    size,
                    mode: Mode::Gcm,
                })
            }
            Tag::Nonce | Tag::Empty => {
                let tag = conn.recv_string()?;
                if !mac::verify(&ciphertext, &key, size, &tag) {
                    return Err(CryptoError::AuthenticationFailed.into());
                }
                if nonce_packet.tag == Tag::Nonce {
                    let nonce: u64 = nonce_packet.parse()?;
                    Ok(IncomingMessage {
                        plaintext: ctr::apply(&ciphertext, &key, size, nonce),
                        size,
                        mode: Mode::Ctr,
                    })
                } else {
                    Ok(IncomingMessage {
                        plaintext: cipher::ecb_decrypt(&ciphertext, &key, size),
                        size,
                        mode: Mode::Ecb,
                    })
                }
            }
            Tag::Error => Err(ProtocolError::PeerError.into()),
            tag => Err(ProtocolError::UnexpectedPacket(format!(
                "{} is not a nonce packet",
                tag
            ))
            .into()),
        }
    }

    /// Refuse a pending request.
    pub fn refuse(&mut self) -> Result<()> {
        let io = self.io_timeout;
        let conn = self.conn_mut()?;
        conn.send_packet(&Packet::new(Tag::Refused), io)
    }

    /// Run the message-send sub-protocol: announce, await the peer's
    /// acknowledgement (they may be away from the keyboard, hence the
    /// generous wait), then stream the round count, ciphertext, nonce
    /// packet, and HMAC where the mode calls for one.
    pub fn send_message(&mut self, plaintext: &[u8], size: KeySize, mode: Mode) -> Result<()> {
        let key = self.shared_key;
        let io = self.io_timeout;
        let response = self.response_timeout;
        let conn = self.conn_mut()?;

        conn.send_packet(&Packet::new(Tag::Message), io)?;

        let reply = conn.recv_packet(response);
        match reply.tag {
            Tag::Ack => {}
            Tag::Refused => return Err(ProtocolError::PeerRefused.into()),
            Tag::Message => return Err(ProtocolError::SimultaneousRequest("message send").into()),
            Tag::Error => return Err(ProtocolError::PeerError.into()),
            tag => {
                return Err(
                    ProtocolError::UnexpectedPacket(format!("{} instead of ACK", tag)).into(),
                )
            }
        }

        conn.send_value(size.rounds() as u64, Tag::Data)?;

        // ECB has no use for the nonce, but one is drawn regardless so the
        // packet sequence stays uniform across modes.
        let nonce = rand::random::<u64>();
        let ciphertext = match mode {
            Mode::Ecb => cipher::ecb_encrypt(plaintext, &key, size),
            Mode::Ctr => ctr::apply(plaintext, &key, size, nonce),
            Mode::Gcm => gcm::encrypt(plaintext, &key, size, nonce),
        };
        conn.send_string(&ciphertext, Tag::Data)?;

        match mode {
            Mode::Ecb => conn.send_packet(&Packet::new(Tag::Empty), io)?,
            Mode::Ctr => conn.send_value(nonce, Tag::Nonce)?,
            Mode::Gcm => conn.send_value(nonce, Tag::Iv)?,
        }

        if mode != Mode::Gcm {
            let tag = mac::message_tag(&ciphertext, &key, size)?;
            conn.send_string(&tag, Tag::Hmac)?;
        }

        log::info!("sent {} byte message ({} {})", plaintext.len(), size, mode);
        Ok(())
    }

    /// Ask the peer to regenerate the shared key. On acknowledgement this
    /// side runs the client role; a refusal is not an error. If both peers
    /// ask at once, neither is listening, and one of them must back off.
    pub fn reexchange(&mut self) -> Result<ReexchangeOutcome> {
        let io = self.io_timeout;
        let response = self.response_timeout;
        let conn = self.conn_mut()?;

        conn.send_packet(&Packet::new(Tag::Reexchange), io)?;

        let reply = conn.recv_packet(response);
        match reply.tag {
            Tag::Ack => {
                let key = build_shared_key(conn, Role::Client)?;
                self.shared_key = key;
                Ok(ReexchangeOutcome::Completed)
            }
            Tag::Refused => Ok(ReexchangeOutcome::Refused),
            Tag::Reexchange => Err(ProtocolError::SimultaneousRequest("re-exchange").into()),
            Tag::Error => Err(ProtocolError::PeerError.into()),
            tag => Err(ProtocolError::UnexpectedPacket(format!("{} instead of ACK", tag)).into()),
        }
    }

    /// Drop the connection, clear the shared key, and return to IDLE. The
    /// peer is not informed; its next operation will simply fail. The
    /// listening socket survives for later listens.
    pub fn terminate(&mut self) {
        self.conn = None;
        self.shared_key.zeroize();
        self.state = State::Idle;
        log::info!("connection terminated");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shared_key.zeroize();
    }
}
