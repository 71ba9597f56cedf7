//! Peer directory related types.
//!
//! The directory is owned and kept fresh by the gossip layer. The selection
//! engine only reads it, with the single exception of
//! [Directory::reset_active_set], the recovery action requested whenever a
//! scan reports an inconsistency.

use crate::*;
use std::sync::Arc;

/// Direction of a [Directory::scan].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanOrder {
    /// Clockwise, by increasing ring order.
    #[default]
    Ascending,
    /// Counter-clockwise, by decreasing ring order.
    Descending,
}

/// Parameters of a [Directory::scan].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanOpts {
    /// Ring location to start at. An ascending scan begins with the first
    /// peer located at or after it, a descending one with the last peer
    /// located at or before it. `None` starts at the respective end of the
    /// ring. Scans never wrap around.
    pub start: Option<u32>,

    /// Peers speaking an older protocol are skipped.
    pub min_version: ProtocolVersion,

    /// Scan direction.
    pub order: ScanOrder,

    /// Also yield the local peer at its place in the ring order.
    pub include_self: bool,
}

impl ScanOpts {
    /// An ascending scan of connected peers only.
    pub fn ascending(start: Option<u32>, min_version: ProtocolVersion) -> Self {
        Self {
            start,
            min_version,
            order: ScanOrder::Ascending,
            include_self: false,
        }
    }
}

/// A lazy cursor over directory entries in ring order.
///
/// The cursor reads directory state as it advances, so entries admitted or
/// removed concurrently may or may not be observed. A structural fault is
/// yielded as [PsError::Inconsistent].
pub type PeerScan = Box<dyn Iterator<Item = PsResult<Arc<PeerInfo>>> + Send>;

/// Represents the ability to store and query member peers.
pub trait Directory: 'static + Send + Sync + std::fmt::Debug {
    /// The number of currently connected peers. The local peer is not
    /// counted.
    fn connected_count(&self) -> usize;

    /// The record of the local peer.
    fn local_peer(&self) -> Arc<PeerInfo>;

    /// Scan connected peers in ring order.
    fn scan(&self, opts: ScanOpts) -> PeerScan;

    /// Get a connected peer by id.
    fn get_connected(&self, peer: &PeerId) -> PsResult<Option<Arc<PeerInfo>>>;

    /// Insert or update peers. Updates carrying an older last-seen stamp
    /// than the stored record are ignored.
    fn insert(&self, peer_list: Vec<Arc<PeerInfo>>) -> PsResult<()>;

    /// Remove a peer.
    fn remove(&self, peer: &PeerId);

    /// Rebuild the active working set after an inconsistency was detected.
    fn reset_active_set(&self);
}

/// Trait-object [Directory].
pub type DynDirectory = Arc<dyn Directory>;

/// A factory for constructing [Directory] instances.
pub trait DirectoryFactory: 'static + Send + Sync + std::fmt::Debug {
    /// Help the builder construct a default config from the chosen
    /// module factories.
    fn default_config(&self, config: &mut Config) -> PsResult<()>;

    /// Validate configuration.
    fn validate_config(&self, config: &Config) -> PsResult<()>;

    /// Construct a directory instance for the given local peer.
    fn create(
        &self,
        builder: Arc<Builder>,
        local: Arc<PeerInfo>,
    ) -> BoxFut<'static, PsResult<DynDirectory>>;
}

/// Trait-object [DirectoryFactory].
pub type DynDirectoryFactory = Arc<dyn DirectoryFactory>;
