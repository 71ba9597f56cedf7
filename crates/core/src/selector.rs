//! The peer selection engine.
//!
//! Content keys are owned by the peers closest to them clockwise on the
//! ring. For every key the engine derives one position per vertical
//! partition of the [RingScheme] and walks the directory from each of
//! them, so a key is replicated to several independent peer sets.
//!
//! All operations are synchronous and only read the directory. Each call
//! builds its own dedup and score state, so one [PeerSelector] can be
//! shared freely between threads.

use peersel_api::ring::{distance, rank_from, RING_MAX};
use peersel_api::*;
use std::collections::HashMap;
use std::sync::Arc;

use crate::filter::PeerFilterEnum;
use crate::merge::RankMerge;

mod ranking;

/// A boxed, owned peer enumeration.
pub type PeerIter = Box<dyn Iterator<Item = Arc<PeerInfo>> + Send>;

/// The outcome of [PeerSelector::select_targets].
#[derive(Debug, Default)]
pub struct Targets {
    /// Accumulated score per selected peer. Closer peers score higher.
    pub ranking: ScoreMap<PeerId>,

    /// The records of all selected peers.
    pub peers: HashMap<PeerId, Arc<PeerInfo>>,
}

impl Targets {
    /// Selected peers, best scored first.
    pub fn ranked(&self) -> Vec<Arc<PeerInfo>> {
        self.ranking
            .keys(false)
            .into_iter()
            .filter_map(|p| self.peers.get(&p).cloned())
            .collect()
    }

    /// Returns `true` if no peer was selected.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

/// Selects the peers responsible for content keys.
#[derive(Debug)]
pub struct PeerSelector {
    config: SelectorConfig,
    scheme: RingScheme,
    directory: DynDirectory,
    report: DynSelectionReport,
}

impl PeerSelector {
    /// Construct a selector from already constructed collaborators.
    pub fn new(
        config: SelectorConfig,
        directory: DynDirectory,
        report: DynSelectionReport,
    ) -> PsResult<Self> {
        config.validate()?;
        let scheme = config.scheme()?;
        Ok(Self {
            config,
            scheme,
            directory,
            report,
        })
    }

    /// Construct a selector with the modules and configuration of
    /// `builder`, on behalf of the `local` peer.
    pub fn create(
        builder: Arc<Builder>,
        local: Arc<PeerInfo>,
    ) -> BoxFut<'static, PsResult<Self>> {
        Box::pin(async move {
            builder.validate_config()?;
            let config = builder
                .config
                .get_module_config::<SelectorModConfig>()?
                .selector;
            let directory =
                builder.directory.create(builder.clone(), local).await?;
            let report = builder.report.create(builder.clone()).await?;
            Self::new(config, directory, report)
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// The ring scheme keys are mapped with.
    pub fn scheme(&self) -> &RingScheme {
        &self.scheme
    }

    /// The directory peers are selected from.
    pub fn directory(&self) -> &DynDirectory {
        &self.directory
    }

    /// The diagnostics report.
    pub fn report(&self) -> &DynSelectionReport {
        &self.report
    }

    fn filter_enum<P>(
        &self,
        start: Option<u32>,
        min_version: ProtocolVersion,
        max: usize,
        predicate: P,
    ) -> PeerFilterEnum<P>
    where
        P: FnMut(&PeerInfo) -> bool,
    {
        PeerFilterEnum::new(
            self.directory.clone(),
            self.report.clone(),
            start,
            min_version,
            max,
            self.config.dedup_capacity as usize,
            predicate,
        )
    }

    /// Peers accepting remote index entries, walking clockwise from
    /// `start`.
    ///
    /// At most `max` peers are yielded. With `also_my_own` the local peer
    /// is merged in at its rank from `start`, exempt from the capability
    /// check and never twice.
    pub fn accept_remote_index_peers(
        &self,
        start: &Id,
        max: usize,
        also_my_own: bool,
    ) -> PeerIter {
        let start = start.loc();
        let peers = self.filter_enum(
            Some(start),
            self.config.index_min_version,
            max,
            |info: &PeerInfo| info.flags.accept_remote_index,
        );

        if !also_my_own {
            return Box::new(peers);
        }

        let local = self.directory.local_peer();
        let by_rank = move |a: &Arc<PeerInfo>, b: &Arc<PeerInfo>| {
            rank_from(start, &a.peer).cmp(&rank_from(start, &b.peer))
        };
        Box::new(
            RankMerge::new(peers, std::iter::once(local), by_rank).take(max),
        )
    }

    /// Collecting form of [PeerSelector::accept_remote_index_peers].
    pub fn accept_remote_index_list(
        &self,
        start: &Id,
        max: usize,
        also_my_own: bool,
    ) -> Vec<Arc<PeerInfo>> {
        self.accept_remote_index_peers(start, max, also_my_own)
            .collect()
    }

    /// Connected peers satisfying `predicate`, over one whole rotation
    /// starting at ring location 0.
    pub fn peers_by_capability<P>(
        &self,
        min_version: ProtocolVersion,
        predicate: P,
    ) -> PeerFilterEnum<P>
    where
        P: FnMut(&PeerInfo) -> bool,
    {
        self.filter_enum(None, min_version, usize::MAX, predicate)
    }

    /// Peers offering urls for remote crawling.
    pub fn remote_crawl_providers(
        &self,
    ) -> impl Iterator<Item = Arc<PeerInfo>> + Send {
        self.peers_by_capability(
            self.config.crawl_min_version,
            |info: &PeerInfo| info.remote_crawl_count() > 0,
        )
    }

    /// Select the peers that should store `key`.
    ///
    /// From each vertical position of the key up to
    /// `min(connected, redundancy)` peers are taken, capped at
    /// `maxTargetsPerPosition`. The n-th peer taken from a position, with
    /// `c` counting down from that budget, scores `2 * c`. Scores of a
    /// peer selected from several positions add up.
    pub fn select_targets(&self, key: &TermId, redundancy: usize) -> Targets {
        let connected = self.directory.connected_count();
        let mut targets = Targets::default();

        for position in self.scheme.vertical_positions(key) {
            let start = RingScheme::position_to_key(position);
            let mut c = connected.min(redundancy);
            let mut cc = self.config.max_targets_per_position;
            let mut peers = self.accept_remote_index_peers(&start, c, false);

            while c > 0 && cc > 0 {
                let Some(info) = peers.next() else {
                    break;
                };
                cc -= 1;

                let score = 2 * c as u64;
                tracing::debug!(
                    %key,
                    position,
                    peer = %info.peer,
                    name = %info.name,
                    score,
                    "selected dht target"
                );
                targets.ranking.inc(info.peer.clone(), score);
                targets.peers.insert(info.peer.clone(), info);
                c -= 1;
            }
        }

        targets
    }

    /// Cheap estimate whether the local peer is responsible for `key` in
    /// the partition `doc` selects.
    ///
    /// Alone in the network the answer is always `true`. Otherwise the
    /// local peer must sit ahead of the target position by at most twice
    /// the mean gap between connected peers.
    pub fn guess_if_own_word(&self, key: &TermId, doc: &DocId) -> bool {
        let connected = self.directory.connected_count();
        if connected == 0 {
            return true;
        }

        let target = self.scheme.position(key, Some(&doc.0));
        let local = self.directory.local_peer();
        let mine = self.scheme.position(&local.peer, Some(&doc.0));
        let d = distance(target, mine);
        if d == 0 {
            return false;
        }

        (d as u64) <= (RING_MAX as u64 / connected as u64) * 2
    }

    /// Exact test whether the local peer ranks among the first
    /// `redundancy` index targets of `key` in the partition `doc` selects.
    pub fn verify_if_own_word(
        &self,
        key: &TermId,
        doc: &DocId,
        redundancy: usize,
    ) -> bool {
        let position = self.scheme.position(key, Some(&doc.0));
        let start = RingScheme::position_to_key(position);
        let local = self.directory.local_peer();
        self.accept_remote_index_peers(&start, redundancy, true)
            .any(|info| info.peer == local.peer)
    }

    /// Whether the local peer should store `key` for `doc` itself.
    ///
    /// The exact verification only runs if the cheap guess says so.
    pub fn shall_be_own_word(
        &self,
        key: &TermId,
        doc: &DocId,
        redundancy: usize,
    ) -> bool {
        if !self.guess_if_own_word(key, doc) {
            tracing::trace!(%key, %doc, "guessed foreign word");
            return false;
        }

        self.report.guessed_own();
        let own = self.verify_if_own_word(key, doc, redundancy);
        tracing::trace!(%key, %doc, own, "verified guessed own word");
        own
    }

    /// A fresh pseudo-random boundary for a transfer of index entries.
    pub fn select_transfer_start() -> TermId {
        use sha2::Digest;

        let now = Timestamp::now().as_micros().to_string();
        let digest = sha2::Sha256::digest(now.as_bytes());
        TermId::from(bytes::Bytes::copy_from_slice(&digest[2..14]))
    }

    /// The first peer accepting remote index entries at or after `start`.
    pub fn limit_over(&self, start: &Id) -> Option<PeerId> {
        self.accept_remote_index_peers(start, 1, false)
            .next()
            .map(|info| info.peer.clone())
    }
}
