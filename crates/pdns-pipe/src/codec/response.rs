//! Answer records sent back to the resolver.

use crate::errors::CodecError;

use super::line::join_record;
use super::version::ProtocolVersion;

/// One answer record.
///
/// Handlers build responses without caring about the negotiated revision;
/// the engine stamps `protocol_version` just before encoding. Scope bits and
/// the authoritative flag only reach the wire at version 3.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Revision to encode at. Zero until the engine stamps it.
    pub protocol_version: u8,
    /// EDNS client-subnet scope bits (version 3).
    pub scope_bits: String,
    /// Authoritative flag (version 3).
    pub auth: String,
    /// Owner name of the record.
    pub name: String,
    /// Record class.
    pub class: String,
    /// Record type.
    pub qtype: String,
    /// Time to live in seconds.
    pub ttl: u32,
    /// Identifier of the query being answered.
    pub id: String,
    /// Record data in presentation format.
    pub content: String,
}

impl Response {
    /// Creates a response with empty version 3 fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        class: impl Into<String>,
        qtype: impl Into<String>,
        ttl: u32,
        id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            qtype: qtype.into(),
            ttl,
            id: id.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Sets the scope bits and authoritative flag sent at version 3.
    #[must_use]
    pub fn with_scope(mut self, scope_bits: impl Into<String>, auth: impl Into<String>) -> Self {
        self.scope_bits = scope_bits.into();
        self.auth = auth.into();
        self
    }

    /// Returns the response re-tagged for `version`.
    #[must_use]
    pub fn at_version(mut self, version: ProtocolVersion) -> Self {
        self.protocol_version = version.number();
        self
    }

    /// Encodes the response as a full `DATA` line, terminator included.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownVersion`] when the response is tagged
    /// with a version other than 1-3, or [`CodecError::EmbeddedDelimiter`]
    /// when a field contains a tab or line break.
    pub fn encode(&self) -> Result<String, CodecError> {
        let revision = ProtocolVersion::try_from(self.protocol_version)?;
        let ttl = self.ttl.to_string();
        let mut fields = Vec::with_capacity(revision.response_fields());
        if revision == ProtocolVersion::V3 {
            fields.push(("scope bits", self.scope_bits.as_str()));
            fields.push(("auth", self.auth.as_str()));
        }
        fields.extend([
            ("name", self.name.as_str()),
            ("class", self.class.as_str()),
            ("type", self.qtype.as_str()),
            ("ttl", ttl.as_str()),
            ("id", self.id.as_str()),
            ("content", self.content.as_str()),
        ]);
        join_record("DATA", &fields)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn response() -> Response {
        Response::new("example.com", "IN", "ANY", 3600, "-1", "foo").with_scope("24", "auth")
    }

    #[rstest]
    #[case(ProtocolVersion::V1)]
    #[case(ProtocolVersion::V2)]
    fn v1_and_v2_share_a_layout(response: Response, #[case] version: ProtocolVersion) {
        let line = response.at_version(version).encode().expect("encode");
        assert_eq!(line, "DATA\texample.com\tIN\tANY\t3600\t-1\tfoo\n");
    }

    #[rstest]
    fn v3_prepends_scope_bits_and_auth(response: Response) {
        let line = response.at_version(ProtocolVersion::V3).encode().expect("encode");
        assert_eq!(line, "DATA\t24\tauth\texample.com\tIN\tANY\t3600\t-1\tfoo\n");
    }

    #[rstest]
    fn v3_keeps_empty_scope_fields() {
        let line = Response::new("example.com", "IN", "A", 60, "7", "1.2.3.4")
            .at_version(ProtocolVersion::V3)
            .encode()
            .expect("encode");
        assert_eq!(line, "DATA\t\t\texample.com\tIN\tA\t60\t7\t1.2.3.4\n");
    }

    #[rstest]
    fn unstamped_responses_fail_to_encode(response: Response) {
        assert_eq!(response.encode(), Err(CodecError::unknown_version(0)));
    }

    #[rstest]
    fn multi_line_content_fails_to_encode() {
        let result = Response::new("example.com", "IN", "TXT", 60, "1", "a\nb")
            .at_version(ProtocolVersion::V1)
            .encode();
        assert_eq!(result, Err(CodecError::EmbeddedDelimiter { field: "content" }));
    }
}
