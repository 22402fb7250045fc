//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{bail, Context, Result};
use std::net::SocketAddr;
use std::str::FromStr;

/// Default cap on an uploaded log file (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Output format of the server's own diagnostic logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogOutput {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogOutput {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => bail!("expected 'text' or 'json', got '{other}'"),
        }
    }
}

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `LOGLENS_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `LOGLENS_PORT`: The port to listen on (default: 8080)
/// - `LOGLENS_MAX_UPLOAD_BYTES`: Largest accepted upload (default: 5 MiB)
/// - `LOGLENS_LOG_FORMAT`: `text` or `json` (default: text)
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Largest accepted log file, in bytes.
    pub max_upload_bytes: usize,
    /// Diagnostic log output format.
    pub log_output: LogOutput,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("LOGLENS_HOST").unwrap_or(defaults.host);

        let port = lookup("LOGLENS_PORT")
            .map(|p| p.trim().parse::<u16>())
            .transpose()
            .context("LOGLENS_PORT must be a valid port number")?
            .unwrap_or(defaults.port);

        let max_upload_bytes = lookup("LOGLENS_MAX_UPLOAD_BYTES")
            .map(|b| b.trim().parse::<usize>())
            .transpose()
            .context("LOGLENS_MAX_UPLOAD_BYTES must be a byte count")?
            .unwrap_or(defaults.max_upload_bytes);

        if max_upload_bytes == 0 {
            bail!("LOGLENS_MAX_UPLOAD_BYTES must be greater than zero");
        }

        let log_output = lookup("LOGLENS_LOG_FORMAT")
            .map(|f| f.parse::<LogOutput>())
            .transpose()
            .context("LOGLENS_LOG_FORMAT is invalid")?
            .unwrap_or(defaults.log_output);

        Ok(Self {
            host,
            port,
            max_upload_bytes,
            log_output,
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port do not form a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_output: LogOutput::Text,
        }
    }
}
