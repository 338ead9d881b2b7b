//! # Interactive Menu
//!
//! The menu loop that drives a session. Choices are filtered by the
//! connection state, every protocol error is surfaced and swallowed, and
//! the loop only ends when the user quits or input runs dry.

use crate::config::Config;
use crate::crypto::{self, KeySize, Mode};
use crate::error::Result;
use crate::session::{PeerRequest, ReexchangeOutcome, Session, State};

use super::output;

const INITIALIZE: &str = "Request new connection";
const LISTEN: &str = "Listen for new connection";
const REQUEST: &str = "Listen for request";
const SEND: &str = "Send an encrypted message";
const REEXCHANGE: &str = "Re-exchange keys";
const TERMINATE: &str = "Terminate connection";
const QUIT: &str = "Quit";

/// Run the menu until the user quits.
pub fn run(config: &Config) -> Result<()> {
    let mut session = Session::new(config);

    if crypto::self_test() {
        output::print_success("cipher self-test passed");
    } else {
        output::print_warning("cipher self-test FAILED; messages will not round-trip");
    }
    output::prompt("");

    loop {
        output::clear_screen();
        println!(
            "palaver v{}  |  Status: {}",
            env!("CARGO_PKG_VERSION"),
            session.state()
        );
        if session.state() == State::Connected {
            let digits = session.key_digits();
            println!(
                "Shared key (mod 100): {:02} {:02} {:02} {:02}",
                digits[0], digits[1], digits[2], digits[3]
            );
        }
        println!();

        let choices: Vec<&str> = match session.state() {
            State::Idle => vec![INITIALIZE, LISTEN, QUIT],
            State::Connected => vec![REQUEST, SEND, REEXCHANGE, TERMINATE, QUIT],
        };
        println!("What would you like to do?");
        for (i, choice) in choices.iter().enumerate() {
            println!("{}: {}", i, choice);
        }

        // End of input quits; a bad selection just re-prompts.
        let Some(line) = output::input_line("") else {
            break;
        };
        let selected = line.trim().parse::<usize>().ok().and_then(|i| choices.get(i));
        let Some(&choice) = selected else {
            output::prompt("Invalid selection");
            continue;
        };

        match choice {
            INITIALIZE => handle_initialize(&mut session, config),
            LISTEN => handle_listen(&mut session, config),
            REQUEST => handle_request(&mut session),
            SEND => handle_send(&mut session),
            REEXCHANGE => handle_reexchange(&mut session),
            TERMINATE => {
                session.terminate();
                output::prompt("Connection terminated");
            }
            _ => break,
        }
    }
    Ok(())
}

fn ask_port(config: &Config) -> Option<u16> {
    let title = format!("Enter a port (default {})", config.network.port);
    match output::input_line(&title)?.trim() {
        "" => Some(config.network.port),
        text => match text.parse::<u16>() {
            Ok(port) if port != 0 => Some(port),
            _ => None,
        },
    }
}

fn handle_initialize(session: &mut Session, config: &Config) {
    let Some(port) = ask_port(config) else {
        output::prompt("Invalid port");
        return;
    };
    let host = match output::input_line(&format!(
        "Enter server address (default {}, or \"local\")",
        config.network.host
    )) {
        Some(line) => match line.trim() {
            "" => config.network.host.clone(),
            "local" => "127.0.0.1".to_string(),
            other => other.to_string(),
        },
        None => return,
    };

    println!("Connecting and exchanging keys...");
    match session.initialize(&host, port) {
        Ok(()) => output::prompt("Connected! Ensure that the shared key matches on both sides"),
        Err(e) => {
            output::print_error(e);
            output::prompt("");
        }
    }
}

fn handle_listen(session: &mut Session, config: &Config) {
    let port = if session.has_listener() {
        session.listener_port().unwrap_or(config.network.port)
    } else {
        match ask_port(config) {
            Some(port) => port,
            None => {
                output::prompt("Invalid port");
                return;
            }
        }
    };

    println!("Listening...");
    match session.listen(port) {
        Ok(()) => output::prompt("Connected! Ensure that the shared key matches on both sides"),
        Err(e) => {
            output::print_error(e);
            output::prompt("");
        }
    }
}

fn handle_request(session: &mut Session) {
    println!("Waiting for a request...");
    match session.await_request() {
        Ok(PeerRequest::Reexchange) => {
            if output::confirm("Peer is requesting to re-exchange keys. Acknowledge?") {
                match session.accept_reexchange() {
                    Ok(()) => output::print_success("keys re-exchanged"),
                    Err(e) => output::print_error(e),
                }
            } else if let Err(e) = session.refuse() {
                output::print_error(e);
            }
        }
        Ok(PeerRequest::Message) => {
            if output::confirm("Peer is sending a message. Acknowledge?") {
                match session.accept_message() {
                    Ok(incoming) => {
                        let text = String::from_utf8_lossy(&incoming.plaintext);
                        println!(
                            "Message ({} {}): {}",
                            incoming.size,
                            incoming.mode,
                            text.trim_end_matches('\0')
                        );
                    }
                    Err(e) => output::print_error(e),
                }
            } else if let Err(e) = session.refuse() {
                output::print_error(e);
            }
        }
        Err(e) => output::print_error(e),
    }
    output::prompt("");
}

fn ask_key_size() -> Option<KeySize> {
    match output::input::<u32>("What size key?\n1. 128\n2. 192\n3. 256")? {
        1 => Some(KeySize::Aes128),
        2 => Some(KeySize::Aes192),
        3 => Some(KeySize::Aes256),
        _ => None,
    }
}

fn ask_mode() -> Option<Mode> {
    match output::input::<u32>("What mode?\n1. ECB\n2. CTR\n3. GCM")? {
        1 => Some(Mode::Ecb),
        2 => Some(Mode::Ctr),
        3 => Some(Mode::Gcm),
        _ => None,
    }
}

fn handle_send(session: &mut Session) {
    let Some(message) = output::input_line("Enter the message:") else {
        return;
    };
    let Some(size) = ask_key_size() else {
        output::prompt("Invalid selection");
        return;
    };
    let Some(mode) = ask_mode() else {
        output::prompt("Invalid selection");
        return;
    };

    println!("Reaching out to the peer...");
    match session.send_message(message.as_bytes(), size, mode) {
        Ok(()) => output::print_success("message delivered"),
        Err(e) => output::print_error(e),
    }
    output::prompt("");
}

fn handle_reexchange(session: &mut Session) {
    println!("Asking the peer to re-exchange keys...");
    match session.reexchange() {
        Ok(ReexchangeOutcome::Completed) => {
            output::print_success("keys re-exchanged");
            output::prompt("Ensure that the shared key matches on both sides");
        }
        Ok(ReexchangeOutcome::Refused) => {
            // The peer said no; nothing to report.
            log::debug!("peer refused the re-exchange");
        }
        Err(e) => {
            output::print_error(e);
            output::prompt("");
        }
    }
}
