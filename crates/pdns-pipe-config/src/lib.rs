//! Shared configuration for pipe backend workers.
//!
//! Configuration is layered with [`ortho_config`]: command-line flags take
//! precedence over `PDNS_PIPE_*` environment variables, which in turn override
//! values read from a configuration file. Anything left unset falls back to
//! the `DEFAULT_*` constants exported here.

mod defaults;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_BANNER, DEFAULT_LOG_FILTER, DEFAULT_NEGOTIATION_ATTEMPTS, DEFAULT_TTL, default_banner,
    default_log_filter, default_log_filter_string, default_log_format,
    default_negotiation_attempts, default_ttl,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved worker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "PDNS_PIPE")]
pub struct Config {
    /// Text returned to the resolver in the handshake acknowledgement.
    #[serde(default = "defaults::default_banner")]
    pub banner: String,
    /// TTL, in seconds, applied to replies that do not set one.
    #[serde(default = "defaults::default_ttl")]
    pub default_ttl: u32,
    /// Number of failed handshakes tolerated before the worker exits.
    #[serde(default = "defaults::default_negotiation_attempts")]
    pub negotiation_attempts: u32,
    /// `tracing` filter expression, e.g. `info` or `pdns_pipe=debug`.
    #[serde(default = "defaults::default_log_filter_string")]
    pub log_filter: String,
    /// Output format for log records written to stderr.
    #[serde(default = "defaults::default_log_format")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            banner: default_banner(),
            default_ttl: default_ttl(),
            negotiation_attempts: default_negotiation_attempts(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Banner sent after a successful handshake.
    #[must_use]
    pub fn banner(&self) -> &str {
        &self.banner
    }

    /// TTL given to replies that do not specify one.
    #[must_use]
    pub const fn default_ttl(&self) -> u32 {
        self.default_ttl
    }

    /// Handshake failures tolerated before giving up. Never less than one.
    #[must_use]
    pub fn negotiation_attempts(&self) -> u32 {
        self.negotiation_attempts.max(1)
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
