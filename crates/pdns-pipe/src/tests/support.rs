//! Canned records and session helpers shared by the protocol suites.

use std::io::Cursor;

use crate::{Backend, HandlerError, ProtocolVersion, Query, Response};

pub(super) type TestBackend = Backend<Cursor<Vec<u8>>, Vec<u8>>;

pub(super) const BANNER: &str = "Testing Backend";

/// Query for `example.com`/`ANY` carrying every field its revision allows.
pub(super) fn fake_query(version: ProtocolVersion) -> Query {
    Query {
        protocol_version: version.number(),
        name: "example.com".to_owned(),
        class: "IN".to_owned(),
        qtype: "ANY".to_owned(),
        id: "-1".to_owned(),
        remote_address: "127.0.0.2".to_owned(),
        local_address: (version >= ProtocolVersion::V2).then(|| "127.0.0.1".to_owned()),
        edns_subnet: (version >= ProtocolVersion::V3).then(|| "127.0.0.3".to_owned()),
    }
}

pub(super) fn fake_query_line(version: ProtocolVersion) -> String {
    fake_query(version).encode().expect("fake query should encode")
}

pub(super) fn fake_response(version: ProtocolVersion) -> Response {
    let response = Response::new("example.com", "IN", "ANY", 3600, "-1", "foo");
    if version == ProtocolVersion::V3 {
        response.with_scope("24", "auth")
    } else {
        response
    }
}

pub(super) fn fake_response_line(version: ProtocolVersion) -> String {
    fake_response(version)
        .at_version(version)
        .encode()
        .expect("fake response should encode")
}

pub(super) fn empty_dispatch(_query: &Query) -> Result<Vec<Response>, HandlerError> {
    Ok(Vec::new())
}

/// Negotiates `version` on a fresh session whose reader also holds `requests`.
pub(super) fn negotiated(version: ProtocolVersion, requests: &str) -> TestBackend {
    let input = format!("HELO\t{version}\n{requests}");
    let mut backend = Backend::new(Cursor::new(input.into_bytes()), Vec::new(), BANNER);
    let negotiated = backend.negotiate().expect("negotiation should succeed");
    assert_eq!(negotiated, version);
    backend
}

/// Output written after the handshake reply.
pub(super) fn answers(backend: &TestBackend) -> String {
    let written = std::str::from_utf8(backend.writer()).expect("utf8 output");
    let handshake = format!("OK\t{BANNER}\n");
    written
        .strip_prefix(handshake.as_str())
        .expect("handshake reply should come first")
        .to_owned()
}
