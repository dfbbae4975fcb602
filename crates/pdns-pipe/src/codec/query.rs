//! Query records received from the resolver.

use crate::errors::CodecError;

use super::line::join_record;
use super::version::ProtocolVersion;

/// A question forwarded by the resolver.
///
/// Name, class, type, id and remote address are present at every revision.
/// The local address arrives from version 2 onwards and the EDNS
/// client-subnet address from version 3; both are `None` when the negotiated
/// revision does not carry them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Revision the query was decoded at.
    pub protocol_version: u8,
    /// Queried name, as sent (case is not normalised).
    pub name: String,
    /// Query class, usually `IN`.
    pub class: String,
    /// Record type, possibly the wildcard `ANY`.
    pub qtype: String,
    /// Resolver-assigned identifier echoed back in every reply.
    pub id: String,
    /// Address of the client that asked the resolver.
    pub remote_address: String,
    /// Address the resolver received the question on (version 2+).
    pub local_address: Option<String>,
    /// EDNS client-subnet address (version 3).
    pub edns_subnet: Option<String>,
}

impl Query {
    /// Decodes the tab-separated payload following the `Q` tag.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownVersion`] when `version` is not 1-3 and
    /// [`CodecError::FieldCount`] when the payload does not carry exactly the
    /// fields that revision mandates.
    pub fn decode(data: &str, version: u8) -> Result<Self, CodecError> {
        let revision = ProtocolVersion::try_from(version)?;
        let parts: Vec<&str> = data.split('\t').collect();

        let (common, local_address, edns_subnet) = match (revision, parts.as_slice()) {
            (ProtocolVersion::V1, [name, class, qtype, id, remote]) => {
                ([*name, *class, *qtype, *id, *remote], None, None)
            }
            (ProtocolVersion::V2, [name, class, qtype, id, remote, local]) => (
                [*name, *class, *qtype, *id, *remote],
                Some((*local).to_owned()),
                None,
            ),
            (ProtocolVersion::V3, [name, class, qtype, id, remote, local, subnet]) => (
                [*name, *class, *qtype, *id, *remote],
                Some((*local).to_owned()),
                Some((*subnet).to_owned()),
            ),
            _ => {
                return Err(CodecError::field_count(version, revision.query_fields()));
            }
        };

        let [name, class, qtype, id, remote_address] = common.map(str::to_owned);
        Ok(Self {
            protocol_version: version,
            name,
            class,
            qtype,
            id,
            remote_address,
            local_address,
            edns_subnet,
        })
    }

    /// Encodes the query as a full `Q` line, terminator included.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownVersion`] when the query is tagged with a
    /// version other than 1-3, or [`CodecError::EmbeddedDelimiter`] when a
    /// field contains a tab or line break.
    pub fn encode(&self) -> Result<String, CodecError> {
        let revision = ProtocolVersion::try_from(self.protocol_version)?;
        let mut fields = vec![
            ("name", self.name.as_str()),
            ("class", self.class.as_str()),
            ("type", self.qtype.as_str()),
            ("id", self.id.as_str()),
            ("remote address", self.remote_address.as_str()),
        ];
        if revision >= ProtocolVersion::V2 {
            fields.push(("local address", self.local_address.as_deref().unwrap_or_default()));
        }
        if revision >= ProtocolVersion::V3 {
            fields.push(("edns subnet", self.edns_subnet.as_deref().unwrap_or_default()));
        }
        join_record("Q", &fields)
    }

    /// Whether the query asks for every record type.
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.qtype == "ANY"
    }
}
