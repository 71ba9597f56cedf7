//! Test utilities associated with the peer directory.

use peersel_api::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A [Directory] wrapper that breaks scans on demand.
///
/// While armed, every scan yields [PsError::Inconsistent] after at most
/// `fail_after` records. A call to
/// [Directory::reset_active_set] disarms it and is counted.
#[derive(Debug)]
pub struct FaultyDirectory {
    inner: DynDirectory,
    fail_after: Mutex<Option<usize>>,
    resets: AtomicUsize,
}

impl FaultyDirectory {
    /// Wrap `inner`, failing every scan after `fail_after` records.
    pub fn create(inner: DynDirectory, fail_after: usize) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_after: Mutex::new(Some(fail_after)),
            resets: AtomicUsize::new(0),
        })
    }

    /// How often a reset was requested.
    pub fn reset_count(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

impl Directory for FaultyDirectory {
    fn connected_count(&self) -> usize {
        self.inner.connected_count()
    }

    fn local_peer(&self) -> Arc<PeerInfo> {
        self.inner.local_peer()
    }

    fn scan(&self, opts: ScanOpts) -> PeerScan {
        let scan = self.inner.scan(opts);
        match *self.fail_after.lock().unwrap() {
            None => scan,
            Some(fail_after) => Box::new(
                scan.take(fail_after)
                    .chain(std::iter::once(Err(PsError::inconsistent(
                        "injected fault",
                    )))),
            ),
        }
    }

    fn get_connected(&self, peer: &PeerId) -> PsResult<Option<Arc<PeerInfo>>> {
        self.inner.get_connected(peer)
    }

    fn insert(&self, peer_list: Vec<Arc<PeerInfo>>) -> PsResult<()> {
        self.inner.insert(peer_list)
    }

    fn remove(&self, peer: &PeerId) {
        self.inner.remove(peer)
    }

    fn reset_active_set(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
        *self.fail_after.lock().unwrap() = None;
        self.inner.reset_active_set();
    }
}
