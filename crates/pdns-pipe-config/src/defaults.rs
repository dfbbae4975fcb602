use crate::logging::LogFormat;

/// Banner sent in the handshake reply when none is configured.
pub const DEFAULT_BANNER: &str = "pdns-pipe";

/// TTL, in seconds, given to replies that do not specify one.
pub const DEFAULT_TTL: u32 = 3600;

/// Failed handshakes tolerated before the worker gives up.
pub const DEFAULT_NEGOTIATION_ATTEMPTS: u32 = 3;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned banner value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_banner() -> String {
    DEFAULT_BANNER.to_owned()
}

/// Default TTL for replies.
#[must_use]
pub const fn default_ttl() -> u32 {
    DEFAULT_TTL
}

/// Default number of tolerated handshake failures.
#[must_use]
pub const fn default_negotiation_attempts() -> u32 {
    DEFAULT_NEGOTIATION_ATTEMPTS
}

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}
