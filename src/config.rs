//! # Configuration
//!
//! Optional TOML configuration for the interactive tool. Every field has a
//! compiled-in default, so the file only needs to mention what it changes.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::constants::{ACCEPT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS, RESPONSE_TIMEOUT_SECS};
use crate::error::{PalaverError, Result};

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkSection,
    #[serde(default)]
    pub timeouts: TimeoutsSection,
}

#[derive(Debug, Deserialize)]
pub struct NetworkSection {
    /// Host offered as the default when initiating a connection
    #[serde(default = "default_host")]
    pub host: String,
    /// Port offered as the default for both listening and connecting
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct TimeoutsSection {
    /// Per-packet send/receive timeout in seconds
    #[serde(default = "default_io")]
    pub io: u64,
    /// Wait for replies that involve the peer's user, in seconds
    #[serde(default = "default_response")]
    pub response: u64,
    /// Deadline for an incoming connection while listening, in seconds
    #[serde(default = "default_accept")]
    pub accept: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7878
}

fn default_io() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_response() -> u64 {
    RESPONSE_TIMEOUT_SECS
}

fn default_accept() -> u64 {
    ACCEPT_TIMEOUT_SECS
}

impl Default for NetworkSection {
    fn default() -> Self {
        NetworkSection {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for TimeoutsSection {
    fn default() -> Self {
        TimeoutsSection {
            io: default_io(),
            response: default_response(),
            accept: default_accept(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            PalaverError::Config(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PalaverError::Config(e.to_string()))
    }

    /// Load from a path when one is given, otherwise fall back to the
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Config::default()),
        }
    }
}

/// Generate an example config
pub fn example_config() -> &'static str {
    r#"# palaver configuration
# Usage: palaver -c palaver.toml

[network]
host = "127.0.0.1"
port = 7878

[timeouts]
io = 5
response = 30
accept = 30
"#
}
