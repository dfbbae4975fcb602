//! Error types for the pipe backend protocol.
//!
//! Failures fall into two tiers. [`RequestError`] covers problems confined to
//! a single request: the engine reports them to the resolver as a `LOG` line
//! followed by `FAIL` and keeps serving. [`SessionError`] covers problems that
//! end the session: a failed handshake or a broken channel.

use std::fmt;
use std::io;

use thiserror::Error;

/// Errors raised while decoding or encoding a protocol record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The query line carried the wrong number of tab-separated fields.
    #[error("v{version} query should have {expected} data parts")]
    FieldCount {
        /// Protocol version the line was decoded against.
        version: u8,
        /// Field count mandated by that version.
        expected: usize,
    },
    /// The record was tagged with a version outside 1-3.
    #[error("unknown protocol version {version}")]
    UnknownVersion {
        /// Offending version number.
        version: u8,
    },
    /// A field would break the line framing if written verbatim.
    #[error("{field} field contains a tab or line break")]
    EmbeddedDelimiter {
        /// Name of the offending field.
        field: &'static str,
    },
}

impl CodecError {
    /// Creates a field count error.
    #[must_use]
    pub const fn field_count(version: u8, expected: usize) -> Self {
        Self::FieldCount { version, expected }
    }

    /// Creates an unknown version error.
    #[must_use]
    pub const fn unknown_version(version: u8) -> Self {
        Self::UnknownVersion { version }
    }
}

/// Error reported by a query handler.
///
/// Only the message travels to the resolver, so handlers are free to build
/// it from whatever failure they ran into.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Creates a handler error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Message reported to the resolver.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Per-request failures. The session survives every one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The `Q` payload could not be decoded.
    #[error(transparent)]
    Decode(#[from] CodecError),
    /// The request line was not valid UTF-8.
    #[error("request line is not valid UTF-8 (first invalid byte at offset {valid_up_to})")]
    InvalidEncoding {
        /// Length in bytes of the valid prefix of the line.
        valid_up_to: usize,
    },
    /// Zone transfer was requested.
    #[error("AXFR requests not supported")]
    UnsupportedOperation,
    /// The command token was not recognised.
    #[error("bad command: {command}")]
    UnknownCommand {
        /// Token received from the resolver.
        command: String,
    },
    /// The handler (or a hook it runs) reported a failure.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl RequestError {
    /// Creates an unknown command error.
    #[must_use]
    pub fn unknown_command(command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            command: command.into(),
        }
    }

    /// Creates an invalid encoding error.
    #[must_use]
    pub const fn invalid_encoding(valid_up_to: usize) -> Self {
        Self::InvalidEncoding { valid_up_to }
    }

    /// Error text with line breaks replaced by spaces, safe to put on the wire.
    #[must_use]
    pub fn flattened(&self) -> String {
        flatten(&self.to_string())
    }
}

/// Step of the session during which an I/O failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoPhase {
    /// Reading the `HELO` line.
    ReadHello,
    /// Writing or flushing the `OK` acknowledgement.
    WriteHandshake,
    /// Reading a request line.
    ReadRequest,
    /// Writing the `LOG`/`FAIL` pair.
    WriteFail,
    /// Flushing the `LOG`/`FAIL` pair.
    FlushFail,
    /// Writing a `DATA` line.
    WriteData,
    /// Writing or flushing `END`.
    WriteEnd,
}

impl fmt::Display for IoPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ReadHello => "reading HELO",
            Self::WriteHandshake => "writing handshake reply",
            Self::ReadRequest => "reading request",
            Self::WriteFail => "writing FAIL response",
            Self::FlushFail => "flushing FAIL response",
            Self::WriteData => "writing DATA response",
            Self::WriteEnd => "writing END",
        };
        f.write_str(text)
    }
}

/// Failures that end the session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The handshake line was not `HELO` followed by a version.
    #[error("bad hello from client: {line}")]
    BadHello {
        /// Line received, without its terminator.
        line: String,
    },
    /// The handshake asked for a version other than 1, 2 or 3.
    #[error("unknown protocol version requested: {requested}")]
    UnknownVersion {
        /// Version text received.
        requested: String,
    },
    /// The peer closed the channel before completing the handshake.
    #[error("stream ended before negotiation")]
    EndOfStream,
    /// [`Backend::run`](crate::Backend::run) was called before a successful
    /// handshake.
    #[error("session has not been negotiated")]
    NotNegotiated,
    /// The session already ended.
    #[error("session is closed")]
    Closed,
    /// Reading from or writing to the channel failed.
    #[error("{source} while {phase}")]
    Io {
        /// Step that failed.
        phase: IoPhase,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl SessionError {
    /// Creates an IO error tagged with the failing step.
    #[must_use]
    pub const fn io(phase: IoPhase, source: io::Error) -> Self {
        Self::Io { phase, source }
    }

    /// Whether a fresh handshake on the same channel may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::BadHello { .. } | Self::UnknownVersion { .. })
    }
}

/// Replaces line breaks with spaces so text fits on one protocol line.
#[must_use]
pub fn flatten(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}
