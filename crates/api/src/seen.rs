//! Bounded identity dedup set.

use crate::*;
use std::collections::HashSet;

/// The identities already visited by one enumeration.
///
/// The set refuses to grow past its capacity. Running into the limit is a
/// recoverable condition reported as [PsError::CapacityExceeded], never a
/// silent drop.
#[derive(Debug)]
pub struct SeenSet {
    seen: HashSet<PeerId>,
    capacity: usize,
}

impl SeenSet {
    /// Construct an empty set that holds at most `capacity` identities.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            // only preallocate a modest amount, most walks are short
            seen: HashSet::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Record `peer`. Returns `Ok(false)` if it was already present.
    pub fn put(&mut self, peer: &PeerId) -> PsResult<bool> {
        if self.seen.contains(peer) {
            return Ok(false);
        }
        if self.seen.len() >= self.capacity {
            return Err(PsError::CapacityExceeded {
                limit: self.capacity,
            });
        }
        self.seen.insert(peer.clone());
        Ok(true)
    }

    /// Number of recorded identities.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns `true` if nothing was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
