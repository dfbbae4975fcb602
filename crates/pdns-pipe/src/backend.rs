//! Session engine for the pipe backend protocol.
//!
//! A [`Backend`] owns one channel to the resolver. It performs the `HELO`
//! handshake once, then answers requests strictly one at a time until the
//! resolver closes the channel. Failures confined to a request are reported
//! as `LOG` + `FAIL` and the loop carries on; failures writing to the channel
//! end the session.

use std::io::{BufRead, Write};

use tracing::{debug, info, warn};

use crate::codec::{ProtocolVersion, Query, Response};
use crate::errors::{HandlerError, IoPhase, RequestError, SessionError, flatten};

/// Tracing target for session activity.
pub(crate) const BACKEND_TARGET: &str = "pdns_pipe::backend";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Unnegotiated,
    Negotiated(ProtocolVersion),
    Closed,
}

/// Requests understood after the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command<'a> {
    Query(&'a str),
    Ping,
    Axfr,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let (token, data) = line.split_once('\t').unwrap_or((line, ""));
        match token {
            "Q" => Self::Query(data),
            "PING" => Self::Ping,
            "AXFR" => Self::Axfr,
            other => Self::Unknown(other),
        }
    }
}

/// One pipe backend session over a reader/writer pair.
///
/// The reader supplies request lines and the writer receives answers; both
/// are usually the worker's stdin and stdout. Wrap the writer in a
/// [`std::io::BufWriter`] if it is unbuffered: the engine flushes after every
/// complete answer.
#[derive(Debug)]
pub struct Backend<R, W> {
    banner: String,
    state: SessionState,
    reader: R,
    writer: W,
    line: Vec<u8>,
}

impl<R: BufRead, W: Write> Backend<R, W> {
    /// Creates an unnegotiated session. `banner` is sent in the handshake
    /// reply.
    #[must_use]
    pub fn new(reader: R, writer: W, banner: impl Into<String>) -> Self {
        Self {
            banner: banner.into(),
            state: SessionState::Unnegotiated,
            reader,
            writer,
            line: Vec::new(),
        }
    }

    /// Banner sent in the handshake reply.
    #[must_use]
    pub fn banner(&self) -> &str {
        &self.banner
    }

    /// Revision agreed during the handshake, if one has completed.
    #[must_use]
    pub const fn protocol_version(&self) -> Option<ProtocolVersion> {
        match self.state {
            SessionState::Negotiated(version) => Some(version),
            SessionState::Unnegotiated | SessionState::Closed => None,
        }
    }

    /// Whether the session has ended.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self.state, SessionState::Closed)
    }

    /// Borrows the underlying writer.
    #[must_use]
    pub const fn writer(&self) -> &W {
        &self.writer
    }

    /// Releases the reader and writer.
    #[must_use]
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// Performs the `HELO` handshake.
    ///
    /// Reads one line which must be `HELO`, a tab, and a version between 1
    /// and 3. On success `OK\t<banner>` is written and the version is
    /// stored for the rest of the session.
    ///
    /// # Errors
    ///
    /// [`SessionError::BadHello`] and [`SessionError::UnknownVersion`] leave
    /// the session unnegotiated so the caller can retry on the same channel.
    /// [`SessionError::EndOfStream`] and [`SessionError::Io`] close it.
    pub fn negotiate(&mut self) -> Result<ProtocolVersion, SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }

        let result = self.read_hello().and_then(|version| {
            self.write_handshake()?;
            Ok(version)
        });

        match &result {
            Ok(version) => {
                info!(
                    target: BACKEND_TARGET,
                    version = version.number(),
                    banner = %self.banner,
                    "pipe session negotiated"
                );
                self.state = SessionState::Negotiated(*version);
            }
            Err(error) if error.is_retryable() => {
                warn!(target: BACKEND_TARGET, %error, "handshake rejected");
            }
            Err(error) => {
                warn!(target: BACKEND_TARGET, %error, "handshake aborted");
                self.state = SessionState::Closed;
            }
        }
        result
    }

    /// Answers requests until the resolver closes the channel.
    ///
    /// `Q` lines are decoded at the negotiated revision and handed to
    /// `handler`; its responses are written as `DATA` lines followed by
    /// `END`. `PING` is answered with a bare `END`. `AXFR` and unknown
    /// commands, like decode and handler failures, are answered with a `LOG`
    /// line and `FAIL`, after which the loop continues.
    ///
    /// The session is closed when this returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotNegotiated`] before a successful handshake,
    /// [`SessionError::Closed`] once the session has ended, and
    /// [`SessionError::Io`] when reading, writing or flushing fails.
    pub fn run<F>(&mut self, mut handler: F) -> Result<(), SessionError>
    where
        F: FnMut(&Query) -> Result<Vec<Response>, HandlerError>,
    {
        let version = match self.state {
            SessionState::Negotiated(version) => version,
            SessionState::Unnegotiated => return Err(SessionError::NotNegotiated),
            SessionState::Closed => return Err(SessionError::Closed),
        };

        let result = self.serve(version, &mut handler);
        self.state = SessionState::Closed;
        match &result {
            Ok(()) => info!(target: BACKEND_TARGET, "resolver closed the pipe"),
            Err(error) => warn!(target: BACKEND_TARGET, %error, "pipe session aborted"),
        }
        result
    }

    fn serve<F>(&mut self, version: ProtocolVersion, handler: &mut F) -> Result<(), SessionError>
    where
        F: FnMut(&Query) -> Result<Vec<Response>, HandlerError>,
    {
        while self.read_line(IoPhase::ReadRequest)? {
            let outcome = match std::str::from_utf8(&self.line) {
                Ok(text) => dispatch(trim_terminator(text), version, handler),
                Err(error) => Err(RequestError::invalid_encoding(error.valid_up_to())),
            };
            match outcome {
                Ok(responses) => self.write_answers(version, responses)?,
                Err(error) => self.write_failure(&error)?,
            }
        }
        Ok(())
    }

    fn read_hello(&mut self) -> Result<ProtocolVersion, SessionError> {
        if !self.read_line(IoPhase::ReadHello)? {
            return Err(SessionError::EndOfStream);
        }
        let text = String::from_utf8_lossy(&self.line);
        let line = trim_terminator(&text);
        let mut parts = line.split('\t');
        let (Some("HELO"), Some(requested), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(SessionError::BadHello {
                line: line.to_owned(),
            });
        };
        requested
            .parse::<u8>()
            .ok()
            .and_then(ProtocolVersion::from_number)
            .ok_or_else(|| SessionError::UnknownVersion {
                requested: requested.to_owned(),
            })
    }

    fn write_handshake(&mut self) -> Result<(), SessionError> {
        writeln!(self.writer, "OK\t{}", self.banner)
            .and_then(|()| self.writer.flush())
            .map_err(|source| SessionError::io(IoPhase::WriteHandshake, source))
    }

    /// Reads the next complete line into the buffer as raw bytes.
    ///
    /// Returns `false` at end of stream. A trailing fragment without a line
    /// terminator is treated as end of stream too. Decoding is left to the
    /// caller so a malformed line never fails the read itself.
    fn read_line(&mut self, phase: IoPhase) -> Result<bool, SessionError> {
        self.line.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.line)
            .map_err(|source| SessionError::io(phase, source))?;
        let complete = self.line.ends_with(b"\n");
        if read > 0 && !complete {
            debug!(
                target: BACKEND_TARGET,
                fragment = %String::from_utf8_lossy(&self.line),
                "discarding unterminated line at end of stream"
            );
        }
        Ok(complete)
    }

    fn write_failure(&mut self, error: &RequestError) -> Result<(), SessionError> {
        warn!(target: BACKEND_TARGET, %error, "request failed");
        writeln!(
            self.writer,
            "LOG\tError handling line: {}\nFAIL",
            error.flattened()
        )
        .map_err(|source| SessionError::io(IoPhase::WriteFail, source))?;
        self.writer
            .flush()
            .map_err(|source| SessionError::io(IoPhase::FlushFail, source))
    }

    fn write_answers(
        &mut self,
        version: ProtocolVersion,
        responses: Vec<Response>,
    ) -> Result<(), SessionError> {
        debug!(
            target: BACKEND_TARGET,
            answers = responses.len(),
            "writing answers"
        );
        for response in responses {
            let data = response.at_version(version).encode().unwrap_or_else(|error| {
                warn!(target: BACKEND_TARGET, %error, "failed to serialise response");
                format!(
                    "LOG\tError serialising response: {}\n",
                    flatten(&error.to_string())
                )
            });
            self.writer
                .write_all(data.as_bytes())
                .map_err(|source| SessionError::io(IoPhase::WriteData, source))?;
        }
        self.writer
            .write_all(b"END\n")
            .and_then(|()| self.writer.flush())
            .map_err(|source| SessionError::io(IoPhase::WriteEnd, source))
    }
}

/// Resolves one request line into responses or a per-request error.
fn dispatch<F>(
    line: &str,
    version: ProtocolVersion,
    handler: &mut F,
) -> Result<Vec<Response>, RequestError>
where
    F: FnMut(&Query) -> Result<Vec<Response>, HandlerError>,
{
    let command = Command::parse(line);
    debug!(target: BACKEND_TARGET, ?command, "dispatching request");
    match command {
        Command::Query(data) => {
            let query = Query::decode(data, version.number())?;
            Ok(handler(&query)?)
        }
        Command::Ping => Ok(Vec::new()),
        Command::Axfr => Err(RequestError::UnsupportedOperation),
        Command::Unknown(token) => Err(RequestError::unknown_command(token)),
    }
}

fn trim_terminator(line: &str) -> &str {
    let content = line.strip_suffix('\n').unwrap_or(line);
    content.strip_suffix('\r').unwrap_or(content)
}
