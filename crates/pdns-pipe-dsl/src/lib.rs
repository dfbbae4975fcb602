//! Regular-expression dispatch for `pdns-pipe` backends.
//!
//! A [`Router`] maps record types and query-name patterns to handlers. Each
//! query gets a fresh [`Context`] that every matching handler shares: the
//! handlers read the query and the pattern's capture groups, add replies, or
//! flag an error that replaces the whole answer.
//!
//! ```no_run
//! use std::io::{self, BufWriter};
//!
//! use pdns_pipe::Backend;
//! use pdns_pipe_dsl::{Context, Router};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut router = Router::new();
//! router
//!     .a(r"^example\.com$", |ctx: &mut Context<'_>| ctx.reply("192.0.2.1"))?
//!     .txt(r"^(\w+)\.example\.com$", |ctx: &mut Context<'_>| {
//!         let label = ctx.capture(0).unwrap_or_default().to_owned();
//!         ctx.reply(format!("\"hello {label}\""));
//!     })?;
//!
//! let stdin = io::stdin();
//! let mut backend = Backend::new(stdin.lock(), BufWriter::new(io::stdout()), "example");
//! backend.negotiate()?;
//! backend.run(|query| router.lookup(query))?;
//! # Ok(())
//! # }
//! ```

mod context;
mod router;

pub use context::Context;
pub use router::{DEFAULT_TTL, Handler, Router};

#[cfg(test)]
mod tests;
