//! Negotiation retry policy and the served session.

use std::io::{BufRead, Write};

use thiserror::Error;

use pdns_pipe::{Backend, SessionError};
use pdns_pipe_config::Config;
use pdns_pipe_dsl::Router;

use crate::bootstrap::Worker;
use crate::health::HealthReporter;

/// Reasons a served session ended unsuccessfully.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The handshake never succeeded.
    #[error("negotiation failed after {attempts} attempt(s): {source}")]
    Negotiation {
        /// Handshakes attempted.
        attempts: u32,
        /// Error from the last attempt.
        #[source]
        source: SessionError,
    },
    /// The channel failed after a successful handshake.
    #[error("session aborted: {0}")]
    Session(#[source] SessionError),
}

/// Negotiates on `reader`/`writer` and answers requests with `router` until
/// the resolver closes the pipe.
///
/// Rejected handshakes are retried on the same channel until
/// [`Config::negotiation_attempts`] of them have failed. End of stream and
/// channel errors during the handshake stop at once.
///
/// # Errors
///
/// Returns [`ServeError::Negotiation`] when no handshake succeeds and
/// [`ServeError::Session`] when the session aborts on a channel failure.
pub fn serve<R, W>(
    config: &Config,
    reader: R,
    writer: W,
    router: &Router,
    reporter: &dyn HealthReporter,
) -> Result<(), ServeError>
where
    R: BufRead,
    W: Write,
{
    let mut backend = Backend::new(reader, writer, config.banner());
    let limit = config.negotiation_attempts();
    let mut attempts = 0;

    let version = loop {
        attempts += 1;
        match backend.negotiate() {
            Ok(version) => break version,
            Err(source) => {
                reporter.negotiation_failed(&source, attempts);
                if !source.is_retryable() || attempts >= limit {
                    return Err(ServeError::Negotiation { attempts, source });
                }
            }
        }
    };

    reporter.session_started(version);
    match backend.run(|query| router.lookup(query)) {
        Ok(()) => {
            reporter.session_ended();
            Ok(())
        }
        Err(error) => {
            reporter.session_failed(&error);
            Err(ServeError::Session(error))
        }
    }
}

impl Worker {
    /// Serves one session with the worker's configuration and reporter.
    ///
    /// # Errors
    ///
    /// See [`serve`].
    pub fn serve<R, W>(&self, reader: R, writer: W, router: &Router) -> Result<(), ServeError>
    where
        R: BufRead,
        W: Write,
    {
        serve(self.config(), reader, writer, router, self.reporter())
    }
}
