//! Filtering and deduplicating wrapper around [RingEnum].

use peersel_api::*;
use std::sync::Arc;

use crate::ring_enum::RingEnum;

/// Yields the peers of a ring walk that satisfy a predicate, each at most
/// once.
///
/// - A record without identity is skipped.
/// - Meeting an identity a second time means the rotation is complete and
///   ends the enumeration.
/// - Records rejected by the predicate are skipped without being charged
///   against the budget.
/// - A directory inconsistency is logged, the directory is asked to reset
///   its active set and the enumeration ends. Running out of dedup
///   capacity also ends it. Neither reaches the caller.
pub struct PeerFilterEnum<P> {
    ring: RingEnum,
    directory: DynDirectory,
    report: DynSelectionReport,
    predicate: P,
    seen: SeenSet,
    remaining: usize,
    done: bool,
}

impl<P> std::fmt::Debug for PeerFilterEnum<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerFilterEnum")
            .field("ring", &self.ring)
            .field("seen", &self.seen.len())
            .field("remaining", &self.remaining)
            .field("done", &self.done)
            .finish()
    }
}

impl<P> PeerFilterEnum<P>
where
    P: FnMut(&PeerInfo) -> bool,
{
    /// Construct a filtered walk yielding at most
    /// `min(max, connected_count)` peers.
    pub fn new(
        directory: DynDirectory,
        report: DynSelectionReport,
        start: Option<u32>,
        min_version: ProtocolVersion,
        max: usize,
        dedup_capacity: usize,
        predicate: P,
    ) -> Self {
        let ring = RingEnum::new(directory.clone(), start, min_version);
        let remaining = max.min(ring.remaining());
        Self {
            ring,
            directory,
            report,
            predicate,
            seen: SeenSet::with_capacity(dedup_capacity),
            remaining,
            done: false,
        }
    }

    fn fault(&mut self, err: PsError) {
        self.done = true;
        if err.is_inconsistent() {
            tracing::error!(
                ?err,
                "peer enumeration aborted, resetting directory"
            );
            self.directory.reset_active_set();
            self.report.directory_reset();
        } else {
            tracing::error!(?err, "peer enumeration aborted");
        }
    }
}

impl<P> Iterator for PeerFilterEnum<P>
where
    P: FnMut(&PeerInfo) -> bool,
{
    type Item = Arc<PeerInfo>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done || self.remaining == 0 {
                return None;
            }

            let info = match self.ring.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(err)) => {
                    self.fault(err);
                    return None;
                }
                Some(Ok(info)) => info,
            };

            if info.peer.is_empty() {
                continue;
            }

            match self.seen.put(&info.peer) {
                Ok(true) => (),
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(err) => {
                    tracing::warn!(?err, "peer enumeration ended early");
                    self.done = true;
                    return None;
                }
            }

            if !(self.predicate)(&info) {
                continue;
            }

            self.remaining -= 1;
            return Some(info);
        }
    }
}
