//! # palaver-aes - Standalone AES Tool
//!
//! File and terminal encryption with the same cipher the messenger uses.
//! The operation is a single mode string, for example `ENC-128-CTR` or
//! `DEC-256-GCM`. Encrypted output starts with the eight-byte little-endian
//! nonce; decryption consumes the same prefix (or prompts for it when the
//! ciphertext arrives on the terminal).

use clap::Parser;
use console::style;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use palaver::constants::NONCE_SIZE;
use palaver::crypto::{cipher, ctr, gcm, KeySize, Mode};
use palaver::error::{CryptoError, PalaverError};

/// palaver-aes - AES-128/192/256 in ECB, CTR, and GCM
#[derive(Parser)]
#[command(
    name = "palaver-aes",
    version,
    about = "Standalone AES file encryption (ECB, CTR, GCM)",
    long_about = None,
    after_help = "Examples:\n  \
        palaver-aes --mode=ENC-256-GCM --infile=plain.txt --outfile=sealed.bin\n  \
        palaver-aes --mode=DEC-256-GCM --infile=sealed.bin --keyfile=my.key\n  \
        palaver-aes --mode=ENC-128-CTR --verbose\n\n\
        The mode string is OP-KSZ-MODE with OP in ENC/DEC, KSZ in\n\
        128/192/256, and MODE in ECB/CTR/GCM."
)]
struct Cli {
    /// Operation string, e.g. ENC-128-CTR or DEC-192-ECB
    #[arg(long)]
    mode: String,

    /// Input file; read from the terminal when omitted
    #[arg(long)]
    infile: Option<PathBuf>,

    /// Output file; write to the terminal when omitted
    #[arg(long)]
    outfile: Option<PathBuf>,

    /// Key file; prompt on the terminal when omitted
    #[arg(long)]
    keyfile: Option<PathBuf>,

    /// Also print nonce and ciphertext bytes
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Encrypt,
    Decrypt,
}

#[derive(Debug, Clone, Copy)]
struct ModeSpec {
    operation: Operation,
    size: KeySize,
    mode: Mode,
}

/// Parse an OP-KSZ-MODE string, field by field, with exact length 11.
fn parse_mode(text: &str) -> Result<ModeSpec, String> {
    if text.len() != 11 || !text.is_ascii() || text.as_bytes()[3] != b'-' || text.as_bytes()[7] != b'-'
    {
        return Err("a valid mode string looks like ENC-128-CTR; see --help".to_string());
    }

    let operation = match &text[0..3] {
        "ENC" => Operation::Encrypt,
        "DEC" => Operation::Decrypt,
        other => {
            return Err(format!(
                "unrecognized operation: {}. Valid options are ENC/DEC",
                other
            ))
        }
    };

    let size = match &text[4..7] {
        "128" => KeySize::Aes128,
        "192" => KeySize::Aes192,
        "256" => KeySize::Aes256,
        other => {
            return Err(format!(
                "unrecognized key size: {}. Valid options are 128/192/256",
                other
            ))
        }
    };

    let mode = match &text[8..11] {
        "ECB" => Mode::Ecb,
        "CTR" => Mode::Ctr,
        "GCM" => Mode::Gcm,
        other => {
            return Err(format!(
                "unrecognized mode: {}. Valid options are ECB/CTR/GCM",
                other
            ))
        }
    };

    Ok(ModeSpec {
        operation,
        size,
        mode,
    })
}

fn read_terminal_line(title: &str) -> io::Result<String> {
    println!("{}", title);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Assemble the key words: load or prompt for key material, zero-pad short
/// keys with a warning, truncate long ones, then split into little-endian
/// 64-bit words.
fn load_key(cli: &Cli, size: KeySize) -> Result<[u64; 4], PalaverError> {
    let mut material = match &cli.keyfile {
        Some(path) => {
            let mut bytes = fs::read(path)?;
            // Key files usually end in a newline that is not key material.
            while bytes.last() == Some(&b'\n') || bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            bytes
        }
        None => read_terminal_line("Enter the key:")?.into_bytes(),
    };

    let wanted = size.bits() / 8;
    if material.len() < wanted {
        eprintln!(
            "WARNING: key only contains {} bits of information; the remainder has been zeroed",
            material.len() * 8
        );
        material.resize(wanted, 0);
    }

    let mut key = [0u64; 4];
    for (i, chunk) in material[..wanted].chunks(8).enumerate() {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        key[i] = u64::from_le_bytes(word);
    }
    Ok(key)
}

/// Fetch the input bytes and the nonce. Files carry the nonce as their
/// first eight bytes on decryption; terminal decryption asks for it (ECB
/// only carries it for compatibility with encrypt output).
fn load_input(cli: &Cli, spec: ModeSpec) -> Result<(Vec<u8>, u64), PalaverError> {
    let mut nonce = rand::random::<u64>();

    let data = match &cli.infile {
        Some(path) => {
            let mut data = fs::read(path)?;
            if spec.operation == Operation::Decrypt {
                if data.len() < NONCE_SIZE {
                    return Err(CryptoError::InvalidLength {
                        expected: NONCE_SIZE,
                        got: data.len(),
                    }
                    .into());
                }
                let mut prefix = [0u8; NONCE_SIZE];
                prefix.copy_from_slice(&data[..NONCE_SIZE]);
                nonce = u64::from_le_bytes(prefix);
                data.drain(..NONCE_SIZE);
            }
            data
        }
        None => {
            let text = read_terminal_line("Enter the input text:")?;
            if spec.operation == Operation::Decrypt {
                let line = read_terminal_line("Enter the nonce:")?;
                nonce = line.trim().parse::<u64>().map_err(|e| {
                    PalaverError::Argument(format!("invalid nonce: {}", e))
                })?;
            }
            text.into_bytes()
        }
    };

    Ok((data, nonce))
}

fn print_bytes(label: &str, data: &[u8]) {
    print!("{}: ", label);
    for byte in data {
        print!("{} ", byte);
    }
    println!();
}

fn run(cli: &Cli) -> Result<(), PalaverError> {
    let spec = parse_mode(&cli.mode).map_err(PalaverError::Argument)?;
    let key = load_key(cli, spec.size)?;
    let (input, nonce) = load_input(cli, spec)?;

    match spec.operation {
        Operation::Encrypt => {
            let ciphertext = match spec.mode {
                Mode::Ecb => cipher::ecb_encrypt(&input, &key, spec.size),
                Mode::Ctr => ctr::apply(&input, &key, spec.size, nonce),
                Mode::Gcm => gcm::encrypt(&input, &key, spec.size, nonce),
            };

            if cli.outfile.is_none() || cli.verbose {
                println!("Nonce: {}", nonce);
                print_bytes("Ciphertext", &ciphertext);
            }
            if let Some(path) = &cli.outfile {
                let mut file = fs::File::create(path)?;
                file.write_all(&nonce.to_le_bytes())?;
                file.write_all(&ciphertext)?;
            }
        }
        Operation::Decrypt => {
            let plaintext = match spec.mode {
                Mode::Ecb => cipher::ecb_decrypt(&input, &key, spec.size),
                Mode::Ctr => ctr::apply(&input, &key, spec.size, nonce),
                Mode::Gcm => gcm::decrypt(&input, &key, spec.size, nonce)?,
            };

            if cli.outfile.is_none() || cli.verbose {
                println!("Nonce: {}", nonce);
                print_bytes("Ciphertext", &input);
                println!("Plaintext: {}", String::from_utf8_lossy(&plaintext));
            }
            if let Some(path) = &cli.outfile {
                fs::write(path, &plaintext)?;
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("{} {}", style("✗").red().bold(), e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_strings_parse() {
        let spec = parse_mode("ENC-128-CTR").unwrap();
        assert_eq!(spec.operation, Operation::Encrypt);
        assert_eq!(spec.size, KeySize::Aes128);
        assert_eq!(spec.mode, Mode::Ctr);

        let spec = parse_mode("DEC-256-GCM").unwrap();
        assert_eq!(spec.operation, Operation::Decrypt);
        assert_eq!(spec.size, KeySize::Aes256);
        assert_eq!(spec.mode, Mode::Gcm);

        assert!(parse_mode("ENC-192-ECB").is_ok());
    }

    #[test]
    fn bad_mode_strings_are_rejected() {
        for bad in [
            "",
            "ENC-128-CT",
            "ENC-128-CTRX",
            "FOO-128-CTR",
            "ENC-129-CTR",
            "ENC-128-XYZ",
            "ENC 128 CTR",
            "enc-128-ctr",
        ] {
            assert!(parse_mode(bad).is_err(), "{:?} should not parse", bad);
        }
    }

    #[test]
    fn non_ascii_mode_string_is_rejected() {
        assert!(parse_mode("ENC-128-CTÄ").is_err());
    }
}
