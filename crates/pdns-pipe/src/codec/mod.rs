//! Tab-delimited record codec for the three pipe protocol revisions.
//!
//! Every record is a single line: a tag (`Q` or `DATA`), then the fields
//! mandated by the negotiated version joined with tabs, then `\n`. Version 2
//! appends the local address to queries; version 3 appends the EDNS
//! client-subnet address to queries and prepends scope bits and the
//! authoritative flag to responses.

mod line;
mod query;
mod response;
mod version;

pub use self::query::Query;
pub use self::response::Response;
pub use self::version::ProtocolVersion;
