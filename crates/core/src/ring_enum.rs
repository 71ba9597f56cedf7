//! Rotation-bounded ring walk over the directory.
//!
//! The walk starts with the connected peer nearest at or after the start
//! location and continues clockwise. Reaching the top of the ring it
//! rewinds exactly once to location 0 and stops as soon as it would pass
//! the start location again. Independently it never yields more records
//! than there were connected peers when the walk was created, so entries
//! admitted while walking cannot extend it beyond one rotation.

use peersel_api::*;
use std::sync::Arc;

enum Phase {
    Start,
    FirstHalf(PeerScan),
    SecondHalf(PeerScan),
    Done,
}

/// A lazy clockwise walk over connected peers.
///
/// Peers below the minimum protocol version are filtered by the directory
/// scan and never charged against the rotation budget. A directory fault
/// is yielded once as an error item, after which the walk is finished.
pub struct RingEnum {
    directory: DynDirectory,
    start: Option<u32>,
    min_version: ProtocolVersion,
    remaining: usize,
    phase: Phase,
}

impl std::fmt::Debug for RingEnum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let phase = match self.phase {
            Phase::Start => "Start",
            Phase::FirstHalf(_) => "FirstHalf",
            Phase::SecondHalf(_) => "SecondHalf",
            Phase::Done => "Done",
        };
        f.debug_struct("RingEnum")
            .field("start", &self.start)
            .field("min_version", &self.min_version)
            .field("remaining", &self.remaining)
            .field("phase", &phase)
            .finish()
    }
}

impl RingEnum {
    /// Walk from `start`, or over the whole ring from location 0 if `None`.
    pub fn new(
        directory: DynDirectory,
        start: Option<u32>,
        min_version: ProtocolVersion,
    ) -> Self {
        let remaining = directory.connected_count();
        Self {
            directory,
            start,
            min_version,
            remaining,
            phase: Phase::Start,
        }
    }

    /// How many more records this walk may yield at most.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    fn emit(
        &mut self,
        item: Option<PsResult<Arc<PeerInfo>>>,
        next: Phase,
    ) -> Option<PsResult<Arc<PeerInfo>>> {
        match item {
            Some(Ok(info)) => {
                self.remaining -= 1;
                self.phase = next;
                Some(Ok(info))
            }
            Some(Err(err)) => {
                self.phase = Phase::Done;
                Some(Err(err))
            }
            None => {
                self.phase = Phase::Done;
                None
            }
        }
    }
}

impl Iterator for RingEnum {
    type Item = PsResult<Arc<PeerInfo>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.remaining == 0 {
                self.phase = Phase::Done;
            }

            match std::mem::replace(&mut self.phase, Phase::Done) {
                Phase::Start => {
                    self.phase = Phase::FirstHalf(self.directory.scan(
                        ScanOpts::ascending(self.start, self.min_version),
                    ));
                }
                Phase::FirstHalf(mut scan) => match scan.next() {
                    None => match self.start {
                        // walked from the ring origin, nothing to rewind to
                        None | Some(0) => return None,
                        Some(_) => {
                            self.phase =
                                Phase::SecondHalf(self.directory.scan(
                                    ScanOpts::ascending(None, self.min_version),
                                ));
                        }
                    },
                    item => return self.emit(item, Phase::FirstHalf(scan)),
                },
                Phase::SecondHalf(mut scan) => {
                    let item = match scan.next() {
                        Some(Ok(info))
                            if self.start.is_some_and(|s| info.loc() >= s) =>
                        {
                            // back at the start, the rotation is complete
                            None
                        }
                        item => item,
                    };
                    return self.emit(item, Phase::SecondHalf(scan));
                }
                Phase::Done => return None,
            }
        }
    }
}

#[cfg(test)]
mod test;
