//! Negotiated protocol revision.

use std::fmt;

use crate::errors::CodecError;

/// Pipe protocol revision agreed during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProtocolVersion {
    /// Name, class, type, id and remote address.
    V1,
    /// Adds the local address.
    V2,
    /// Adds the EDNS client-subnet address, plus scope bits and the
    /// authoritative flag on responses.
    V3,
}

impl ProtocolVersion {
    /// Every supported revision, oldest first.
    pub const ALL: [Self; 3] = [Self::V1, Self::V2, Self::V3];

    /// Maps a wire number onto a revision.
    #[must_use]
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            3 => Some(Self::V3),
            _ => None,
        }
    }

    /// Wire number of this revision.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
        }
    }

    /// Number of tab-separated fields following `Q` at this revision.
    #[must_use]
    pub const fn query_fields(self) -> usize {
        match self {
            Self::V1 => 5,
            Self::V2 => 6,
            Self::V3 => 7,
        }
    }

    /// Number of tab-separated fields following `DATA` at this revision.
    #[must_use]
    pub const fn response_fields(self) -> usize {
        match self {
            Self::V1 | Self::V2 => 6,
            Self::V3 => 8,
        }
    }
}

impl TryFrom<u8> for ProtocolVersion {
    type Error = CodecError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::from_number(number).ok_or(CodecError::unknown_version(number))
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}
