//! Age based ranking of the directory.

use super::*;

impl PeerSelector {
    /// Up to `count` connected peers ordered by how long ago they were
    /// last seen: oldest first if `up` is `false`, youngest first
    /// otherwise.
    pub fn peers_by_age(&self, up: bool, count: usize) -> Vec<Arc<PeerInfo>> {
        self.peers_by_age_at(Timestamp::now(), up, count)
    }

    /// [PeerSelector::peers_by_age] evaluated at the given time.
    ///
    /// Each peer scores the whole minutes between its last seen stamp and
    /// one day after `now`. Only the first `ageScanLimit` peers of the
    /// ring are scored and peers without a last seen stamp are left out.
    /// A directory fault yields an empty result.
    pub fn peers_by_age_at(
        &self,
        now: Timestamp,
        up: bool,
        count: usize,
    ) -> Vec<Arc<PeerInfo>> {
        let connected = self.directory.connected_count();
        let count = count.min(connected);
        let limit = connected.min(self.config.age_scan_limit as usize);
        let reference = now + std::time::Duration::from_secs(60 * 60 * 24);

        let mut scores = ScoreMap::new();
        let scan = self
            .directory
            .scan(ScanOpts::ascending(None, ProtocolVersion::ANY));
        for item in scan.take(limit) {
            match item {
                Ok(info) => {
                    if let Some(last_seen) = info.last_seen {
                        scores.inc(
                            info.peer.clone(),
                            reference.abs_diff_minutes(last_seen) as u64,
                        );
                    }
                }
                Err(err) => {
                    tracing::error!(?err, "age ranking scan failed");
                    if err.is_inconsistent() {
                        self.directory.reset_active_set();
                        self.report.directory_reset();
                    }
                    return Vec::new();
                }
            }
        }

        let mut out = Vec::with_capacity(count);
        for peer in scores.keys(up) {
            if out.len() >= count {
                break;
            }
            match self.directory.get_connected(&peer) {
                Ok(Some(info)) => out.push(info),
                // removed while ranking
                Ok(None) => (),
                Err(err) => {
                    tracing::error!(?err, %peer, "age ranking lookup failed");
                    return Vec::new();
                }
            }
        }
        out
    }
}
