//! Two-peer end-to-end tests over loopback TCP.
//!
//! Each test runs the server role on a background thread and drives the
//! client from the test thread, exactly as two interactive instances would
//! behave with the menu taken out of the loop.

use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use palaver::crypto::{KeySize, Mode};
use palaver::session::{PeerRequest, ReexchangeOutcome, Session, State};
use palaver::Config;

/// Grab an ephemeral port the OS considers free.
fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Connect a client session to a port a server thread is about to listen
/// on, retrying while the listener comes up.
fn connect_client(port: u16) -> Session {
    let mut session = Session::new(&Config::default());
    for attempt in 0..50 {
        match session.initialize("127.0.0.1", port) {
            Ok(()) => return session,
            Err(_) if attempt < 49 => thread::sleep(Duration::from_millis(50)),
            Err(e) => panic!("client could not connect: {}", e),
        }
    }
    unreachable!()
}

#[test]
fn four_round_handshake_agrees() {
    let port = free_port();

    let server = thread::spawn(move || {
        let mut session = Session::new(&Config::default());
        session.listen(port).unwrap();
        assert_eq!(session.state(), State::Connected);
        session.shared_key()
    });

    let client = connect_client(port);
    assert_eq!(client.state(), State::Connected);

    let server_key = server.join().unwrap();
    assert_eq!(client.shared_key(), server_key);
    assert_ne!(server_key, [0u64; 4]);
}

#[test]
fn messages_cross_in_every_mode() {
    let port = free_port();
    let text = b"the quick brown fox jumps over the lazy dog";

    let server = thread::spawn(move || {
        let mut session = Session::new(&Config::default());
        session.listen(port).unwrap();

        let mut received = Vec::new();
        for _ in 0..3 {
            match session.await_request().unwrap() {
                PeerRequest::Message => received.push(session.accept_message().unwrap()),
                other => panic!("unexpected request {:?}", other),
            }
        }
        received
    });

    let mut client = connect_client(port);
    client
        .send_message(text, KeySize::Aes128, Mode::Ecb)
        .unwrap();
    client
        .send_message(text, KeySize::Aes192, Mode::Ctr)
        .unwrap();
    client
        .send_message(text, KeySize::Aes256, Mode::Gcm)
        .unwrap();

    let received = server.join().unwrap();
    assert_eq!(received.len(), 3);

    // ECB and CTR deliver the zero-padded plaintext; GCM is exact.
    assert_eq!(received[0].mode, Mode::Ecb);
    assert_eq!(&received[0].plaintext[..text.len()], text);
    assert!(received[0].plaintext[text.len()..].iter().all(|&b| b == 0));

    assert_eq!(received[1].mode, Mode::Ctr);
    assert_eq!(received[1].size, KeySize::Aes192);
    assert_eq!(&received[1].plaintext[..text.len()], text);

    assert_eq!(received[2].mode, Mode::Gcm);
    assert_eq!(received[2].plaintext, text);
}

#[test]
fn reexchange_replaces_the_key_on_both_sides() {
    let port = free_port();

    let server = thread::spawn(move || {
        let mut session = Session::new(&Config::default());
        session.listen(port).unwrap();
        let before = session.shared_key();

        match session.await_request().unwrap() {
            PeerRequest::Reexchange => session.accept_reexchange().unwrap(),
            other => panic!("unexpected request {:?}", other),
        }
        (before, session.shared_key())
    });

    let mut client = connect_client(port);
    let client_before = client.shared_key();
    let outcome = client.reexchange().unwrap();
    assert_eq!(outcome, ReexchangeOutcome::Completed);

    let (server_before, server_after) = server.join().unwrap();
    assert_eq!(client_before, server_before);
    assert_eq!(client.shared_key(), server_after);
    assert_ne!(client.shared_key(), client_before);
}

#[test]
fn refusing_a_message_surfaces_to_the_sender() {
    let port = free_port();

    let server = thread::spawn(move || {
        let mut session = Session::new(&Config::default());
        session.listen(port).unwrap();
        match session.await_request().unwrap() {
            PeerRequest::Message => session.refuse().unwrap(),
            other => panic!("unexpected request {:?}", other),
        }
    });

    let mut client = connect_client(port);
    let result = client.send_message(b"unwanted", KeySize::Aes128, Mode::Gcm);
    assert!(result.is_err());
    assert_eq!(client.state(), State::Connected);

    server.join().unwrap();
}

#[test]
fn terminate_returns_to_idle_and_clears_the_key() {
    let port = free_port();

    let server = thread::spawn(move || {
        let mut session = Session::new(&Config::default());
        session.listen(port).unwrap();
        session.terminate();
        assert_eq!(session.state(), State::Idle);
        assert_eq!(session.shared_key(), [0u64; 4]);
    });

    let mut client = connect_client(port);
    client.terminate();
    assert_eq!(client.state(), State::Idle);
    assert_eq!(client.shared_key(), [0u64; 4]);

    server.join().unwrap();
}
