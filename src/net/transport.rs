//! # Transport
//!
//! Timed, whole-frame packet I/O over a TCP stream, plus the value and
//! string framing built on top of it. Every send and receive is guarded by
//! an explicit timeout; expiry surfaces as an error value (or an
//! ERROR-tagged packet on the receive path), never as a silent stall.
//!
//! The listening socket lives in its own handle so it can be created once
//! and reused across listens, independent of the per-peer connection.

use std::fmt;
use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream, ToSocketAddrs};
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use crate::constants::{FRAME_SIZE, PACKET_SIZE};
use crate::error::{NetworkError, ProtocolError, Result};

use super::packet::{Packet, Tag};

/// An established peer connection. Closing is implicit: dropping the
/// transport releases the socket on every path.
pub struct Transport {
    stream: TcpStream,
    timeout: Duration,
}

impl Transport {
    /// Connect to a listening peer, bounding the connection attempt by the
    /// same timeout used for subsequent I/O.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|e| NetworkError::ConnectFailed(e.to_string()))?
            .next()
            .ok_or_else(|| NetworkError::ConnectFailed(format!("{}:{} did not resolve", host, port)))?;

        let stream = TcpStream::connect_timeout(&addr, timeout)
            .map_err(|e| NetworkError::ConnectFailed(e.to_string()))?;
        Self::from_stream(stream, timeout)
    }

    pub(crate) fn from_stream(stream: TcpStream, timeout: Duration) -> Result<Self> {
        stream.set_nodelay(true)?;
        Ok(Transport { stream, timeout })
    }

    /// Transmit one whole frame, waiting at most `timeout` for the socket
    /// to take it.
    pub fn send_packet(&mut self, packet: &Packet, timeout: Duration) -> Result<()> {
        self.stream.set_write_timeout(Some(timeout))?;
        let frame = packet.serialize();
        match self.stream.write_all(&frame).and_then(|_| self.stream.flush()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                Err(NetworkError::Timeout.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read one whole frame, waiting at most `timeout`. Failure of any kind
    /// (timeout, hang-up, malformed tag) comes back as an ERROR-tagged
    /// packet so callers handle it like any other peer error.
    pub fn recv_packet(&mut self, timeout: Duration) -> Packet {
        if self.stream.set_read_timeout(Some(timeout)).is_err() {
            return Packet::new(Tag::Error);
        }
        let mut frame = [0u8; FRAME_SIZE];
        match self.stream.read_exact(&mut frame) {
            Ok(()) => Packet::deserialize(&frame).unwrap_or_else(|_| Packet::new(Tag::Error)),
            Err(_) => Packet::new(Tag::Error),
        }
    }

    /// Render a value as decimal text and send it under the given tag.
    pub fn send_value<T: fmt::Display>(&mut self, value: T, tag: Tag) -> Result<()> {
        let packet = Packet::with_text(tag, &value.to_string())?;
        self.send_packet(&packet, self.timeout)
    }

    /// Receive a packet and parse its payload as a value.
    pub fn recv_value<T: FromStr>(&mut self) -> Result<T>
    where
        T::Err: fmt::Display,
    {
        let packet = self.recv_packet(self.timeout);
        if packet.tag == Tag::Error {
            return Err(ProtocolError::PeerError.into());
        }
        packet.parse()
    }

    /// Send a byte string of any length: a leading DATA packet carrying the
    /// length, then one packet per 1024-byte chunk, the last tagged FINAL.
    pub fn send_string(&mut self, data: &[u8], tag: Tag) -> Result<()> {
        self.send_value(data.len() as u64, Tag::Data)?;

        if data.is_empty() {
            return self.send_packet(&Packet::new(Tag::Final), self.timeout);
        }

        let last = (data.len() - 1) / PACKET_SIZE;
        for (i, chunk) in data.chunks(PACKET_SIZE).enumerate() {
            let chunk_tag = if i == last { Tag::Final } else { tag };
            self.send_packet(&Packet::with_bytes(chunk_tag, chunk), self.timeout)?;
        }
        Ok(())
    }

    /// Receive a byte string: read the length, then packets until FINAL,
    /// then trim the concatenated payloads to the declared length.
    pub fn recv_string(&mut self) -> Result<Vec<u8>> {
        let length: u64 = self.recv_value()?;
        let length = length as usize;

        let mut data = Vec::with_capacity(length.min(1 << 20));
        loop {
            let packet = self.recv_packet(self.timeout);
            if packet.tag == Tag::Error {
                return Err(ProtocolError::PeerError.into());
            }
            data.extend_from_slice(&packet.payload);
            if packet.tag == Tag::Final {
                break;
            }
            if data.len() > length.saturating_add(PACKET_SIZE) {
                return Err(ProtocolError::UnexpectedPacket(format!(
                    "string transfer exceeds its declared {} bytes",
                    length
                ))
                .into());
            }
        }
        data.truncate(length);
        Ok(data)
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("peer", &self.stream.peer_addr().ok())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// The listening half. Bound once per process and reused for every listen.
pub struct Listener {
    inner: TcpListener,
    port: u16,
}

impl Listener {
    pub fn bind(port: u16) -> Result<Self> {
        let inner = TcpListener::bind(("0.0.0.0", port))
            .map_err(|e| NetworkError::BindFailed(e.to_string()))?;
        let port = inner.local_addr()?.port();
        log::info!("listening socket bound on port {}", port);
        Ok(Listener { inner, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Accept exactly one connection, giving up after `deadline`.
    pub fn accept(&self, deadline: Duration, io_timeout: Duration) -> Result<Transport> {
        self.inner.set_nonblocking(true)?;
        let started = Instant::now();
        let result: Result<TcpStream> = loop {
            match self.inner.accept() {
                Ok((stream, peer)) => {
                    log::info!("accepted connection from {}", peer);
                    break Ok(stream);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    if started.elapsed() >= deadline {
                        break Err(NetworkError::AcceptTimeout.into());
                    }
                    thread::sleep(Duration::from_millis(50));
                }
                Err(e) => break Err(e.into()),
            }
        };
        self.inner.set_nonblocking(false)?;
        let stream: TcpStream = result?;
        stream.set_nonblocking(false)?;
        Transport::from_stream(stream, io_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback_pair(timeout: Duration) -> (Transport, Transport) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || listener.accept().unwrap().0);
        let client = TcpStream::connect(addr).unwrap();
        let server = handle.join().unwrap();
        (
            Transport::from_stream(client, timeout).unwrap(),
            Transport::from_stream(server, timeout).unwrap(),
        )
    }

    #[test]
    fn packets_cross_the_wire_whole() {
        let (mut a, mut b) = loopback_pair(Duration::from_secs(5));
        let sent = Packet::with_bytes(Tag::Message, b"hello");
        a.send_packet(&sent, Duration::from_secs(5)).unwrap();
        let got = b.recv_packet(Duration::from_secs(5));
        assert_eq!(got.tag, Tag::Message);
        assert_eq!(got.payload, sent.payload);
    }

    #[test]
    fn values_round_trip_as_text() {
        let (mut a, mut b) = loopback_pair(Duration::from_secs(5));
        a.send_value(0xdead_beef_u64, Tag::Nonce).unwrap();
        let got: u64 = b.recv_value().unwrap();
        assert_eq!(got, 0xdead_beef);
    }

    #[test]
    fn strings_of_every_shape_round_trip() {
        let (mut a, mut b) = loopback_pair(Duration::from_secs(5));
        let cases: Vec<Vec<u8>> = vec![
            Vec::new(),
            b"short".to_vec(),
            vec![0u8; 100],                        // embedded NULs survive
            (0..=255u8).cycle().take(1024).collect(), // exactly one packet
            (0..=255u8).cycle().take(1025).collect(), // one byte over
            (0..=255u8).cycle().take(5000).collect(),
        ];
        let expected = cases.clone();
        let writer = thread::spawn(move || {
            for case in &cases {
                a.send_string(case, Tag::Data).unwrap();
            }
        });
        for want in &expected {
            let got = b.recv_string().unwrap();
            assert_eq!(&got, want);
        }
        writer.join().unwrap();
    }

    #[test]
    fn receive_timeout_yields_an_error_packet() {
        let (mut a, _b) = loopback_pair(Duration::from_millis(100));
        let started = Instant::now();
        let packet = a.recv_packet(Duration::from_millis(100));
        assert_eq!(packet.tag, Tag::Error);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn hangup_yields_an_error_packet() {
        let (mut a, b) = loopback_pair(Duration::from_secs(1));
        drop(b);
        let packet = a.recv_packet(Duration::from_secs(1));
        assert_eq!(packet.tag, Tag::Error);
    }

    #[test]
    fn accept_deadline_expires() {
        let listener = Listener::bind(0).unwrap();
        let started = Instant::now();
        let result = listener.accept(Duration::from_millis(150), Duration::from_secs(1));
        assert!(result.is_err());
        assert!(started.elapsed() >= Duration::from_millis(150));
    }
}
