//! Types dealing with peer records.
//!
//! A [PeerInfo] is what the directory knows about one member peer: its
//! identity (and therefore its ring location), capability flags, the
//! protocol version it speaks, when it was last seen and a bag of free-form
//! attributes announced by the peer.
//!
//! The canonical encoding for this info is JSON.
//!
//! ```json
//! {
//!   "title": "PeerInfo",
//!   "type": "object",
//!   "properties": {
//!     "peer": { "type": "string", "required": true, "description": "base64" },
//!     "name": { "type": "string", "description": "optional" },
//!     "flags": {
//!       "type": "object",
//!       "description": "optional, all flags default to false",
//!       "properties": {
//!         "acceptRemoteIndex": { "type": "boolean" },
//!         "providesRemoteCrawlLists": { "type": "boolean" }
//!       }
//!     },
//!     "version": { "type": "number", "description": "thousandths, optional" },
//!     "lastSeen": {
//!         "type": "string",
//!         "description": "i64 micros since unix epoch, optional"
//!     },
//!     "attributes": { "type": "object", "description": "string map, optional" }
//!   }
//! }
//! ```

use crate::*;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Attribute key holding the number of urls a peer offers for remote
/// crawling.
pub const ATTR_REMOTE_CRAWL_COUNT: &str = "rCount";

/// A peer protocol version, in thousandths.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct ProtocolVersion(pub u32);

impl ProtocolVersion {
    /// Any version at all.
    pub const ANY: ProtocolVersion = ProtocolVersion(0);

    /// First version able to store index collections for remote peers.
    pub const HANDLES_COLLECTION_INDEX: ProtocolVersion = ProtocolVersion(486);

    /// First version able to hand out remote crawl url lists.
    pub const PROVIDES_REMOTE_CRAWL_LISTS: ProtocolVersion =
        ProtocolVersion(550);
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:03}", self.0 / 1000, self.0 % 1000)
    }
}

/// Capabilities a peer advertises.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "camelCase", default)]
pub struct PeerFlags {
    /// The peer is willing to store index entries on behalf of others.
    /// Peers without this flag (private "robinson" peers) are never
    /// selected as index targets.
    pub accept_remote_index: bool,

    /// The peer hands out url lists for remote crawling.
    pub provides_remote_crawl_lists: bool,
}

mod serde_opt_string_timestamp {
    pub fn serialize<S>(
        t: &Option<crate::Timestamp>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match t {
            None => serializer.serialize_none(),
            Some(t) => serializer.serialize_str(&t.as_micros().to_string()),
        }
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<Option<crate::Timestamp>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s: Option<String> = serde::Deserialize::deserialize(deserializer)?;
        match s {
            None => Ok(None),
            Some(s) => {
                let i: i64 = s.parse().map_err(serde::de::Error::custom)?;
                Ok(Some(crate::Timestamp::from_micros(i)))
            }
        }
    }
}

/// PeerInfo stores metadata related to one member peer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerInfo {
    /// The peer id. An empty id marks a malformed record.
    pub peer: PeerId,

    /// Human readable peer name.
    #[serde(default)]
    pub name: String,

    /// Advertised capabilities.
    #[serde(default)]
    pub flags: PeerFlags,

    /// Protocol version spoken by the peer.
    #[serde(default)]
    pub version: ProtocolVersion,

    /// When the peer was last seen by the gossip layer.
    #[serde(
        default,
        with = "serde_opt_string_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_seen: Option<Timestamp>,

    /// Free-form attributes announced by the peer.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl PeerInfo {
    /// Decode a canonical json encoding of a peer info.
    pub fn decode(encoded: &[u8]) -> PsResult<Arc<Self>> {
        let info: Self = serde_json::from_slice(encoded)
            .map_err(|e| PsError::other_src("decoding peer_info", e))?;
        Ok(Arc::new(info))
    }

    /// Get the canonical json encoding of this peer info.
    pub fn encode(&self) -> PsResult<String> {
        serde_json::to_string(self)
            .map_err(|e| PsError::other_src("encoding peer_info", e))
    }

    /// Ring location of this peer.
    pub fn loc(&self) -> u32 {
        self.peer.loc()
    }

    /// Read a numeric attribute. Missing or unparsable values read as
    /// `None`.
    pub fn attr_u64(&self, key: &str) -> Option<u64> {
        self.attributes.get(key).and_then(|v| v.parse().ok())
    }

    /// Number of urls offered for remote crawling, zero if not announced.
    pub fn remote_crawl_count(&self) -> u64 {
        self.attr_u64(ATTR_REMOTE_CRAWL_COUNT).unwrap_or(0)
    }
}
