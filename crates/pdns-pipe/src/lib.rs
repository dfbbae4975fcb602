//! Worker side of the PowerDNS pipe backend protocol.
//!
//! PowerDNS can delegate queries to an external process, talking to it over
//! stdin/stdout with a line-oriented protocol. This crate implements that
//! protocol for the worker:
//!
//! - [`Backend`] performs the `HELO` handshake and runs the request loop,
//!   answering `Q`, `PING` and `AXFR` lines one at a time;
//! - [`Query`] and [`Response`] encode and decode the tab-separated records
//!   of protocol versions 1, 2 and 3;
//! - [`errors`] separates per-request failures, reported to the resolver as
//!   `LOG` + `FAIL`, from failures that end the session.
//!
//! Answers come from a handler closure. `pdns-pipe-dsl` provides a router
//! that builds one from regular expressions registered per record type.
//!
//! ```no_run
//! use std::io::{self, BufWriter};
//!
//! use pdns_pipe::{Backend, HandlerError, Query, Response};
//!
//! fn answer(query: &Query) -> Result<Vec<Response>, HandlerError> {
//!     Ok(vec![Response::new(&query.name, "IN", "A", 300, &query.id, "192.0.2.1")])
//! }
//!
//! # fn main() -> Result<(), pdns_pipe::SessionError> {
//! let stdin = io::stdin();
//! let mut backend = Backend::new(stdin.lock(), BufWriter::new(io::stdout()), "example");
//! backend.negotiate()?;
//! backend.run(answer)?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod codec;
pub mod errors;

pub use backend::Backend;
pub use codec::{ProtocolVersion, Query, Response};
pub use errors::{CodecError, HandlerError, IoPhase, RequestError, SessionError};

#[cfg(test)]
mod tests;
