//! Test utilities associated with peer records.

use peersel_api::*;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::id::peer_id_at;

/// Peer record builder for testing.
///
/// By default the peer accepts remote index entries, speaks the
/// collection index protocol and was last seen now.
#[derive(Debug, Default)]
pub struct PeerBuilder {
    /// Optional peer id. If not provided, a random one is used.
    pub peer: Option<PeerId>,
    /// Optional name. If not provided, it is derived from the id.
    pub name: Option<String>,
    /// Optional flags. If not provided, only accept_remote_index is set.
    pub flags: Option<PeerFlags>,
    /// Optional protocol version. If not provided,
    /// [ProtocolVersion::HANDLES_COLLECTION_INDEX].
    pub version: Option<ProtocolVersion>,
    /// Optional last seen. `Some(None)` builds a record without one.
    pub last_seen: Option<Option<Timestamp>>,
    /// Extra attributes.
    pub attributes: BTreeMap<String, String>,
}

impl PeerBuilder {
    /// Start building a peer located exactly at `loc`.
    pub fn at(loc: u32) -> Self {
        Self {
            peer: Some(peer_id_at(loc, 0)),
            ..Default::default()
        }
    }

    /// Start building a peer at `loc` that is distinguished from other
    /// peers at the same location by `tag`.
    pub fn at_tagged(loc: u32, tag: u32) -> Self {
        Self {
            peer: Some(peer_id_at(loc, tag)),
            ..Default::default()
        }
    }

    /// Set the peer id.
    pub fn with_peer(mut self, peer: PeerId) -> Self {
        self.peer = Some(peer);
        self
    }

    /// Set whether the peer accepts remote index entries.
    pub fn with_accept_remote_index(mut self, accept: bool) -> Self {
        let mut flags = self.flags.unwrap_or(PeerFlags {
            accept_remote_index: true,
            ..Default::default()
        });
        flags.accept_remote_index = accept;
        self.flags = Some(flags);
        self
    }

    /// Set the protocol version.
    pub fn with_version(mut self, version: ProtocolVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Set the last seen timestamp, `None` to omit it.
    pub fn with_last_seen(mut self, last_seen: Option<Timestamp>) -> Self {
        self.last_seen = Some(last_seen);
        self
    }

    /// Announce a number of urls for remote crawling.
    pub fn with_remote_crawl_count(mut self, count: u64) -> Self {
        self.attributes
            .insert(ATTR_REMOTE_CRAWL_COUNT.to_string(), count.to_string());
        self
    }

    /// Build the peer record.
    pub fn build(self) -> Arc<PeerInfo> {
        let peer = self.peer.unwrap_or_else(crate::id::random_peer_id);
        let name = self.name.unwrap_or_else(|| format!("peer-{peer}"));
        let flags = self.flags.unwrap_or(PeerFlags {
            accept_remote_index: true,
            ..Default::default()
        });
        let version = self
            .version
            .unwrap_or(ProtocolVersion::HANDLES_COLLECTION_INDEX);
        let last_seen =
            self.last_seen.unwrap_or_else(|| Some(Timestamp::now()));
        Arc::new(PeerInfo {
            peer,
            name,
            flags,
            version,
            last_seen,
            attributes: self.attributes,
        })
    }
}
