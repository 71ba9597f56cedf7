//! A production-ready memory-based peer directory.

use peersel_api::*;
use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard};

/// A production-ready memory-based directory factory.
///
/// This stores peer records in a hash map by [PeerId], next to a ring index
/// ordered by (location, id) that serves the ordered scans.
#[derive(Debug)]
pub struct MemDirectoryFactory {}

impl MemDirectoryFactory {
    /// Construct a new MemDirectoryFactory
    pub fn create() -> DynDirectoryFactory {
        let out: DynDirectoryFactory = Arc::new(Self {});
        out
    }
}

impl DirectoryFactory for MemDirectoryFactory {
    fn default_config(&self, _config: &mut Config) -> PsResult<()> {
        Ok(())
    }

    fn validate_config(&self, _config: &Config) -> PsResult<()> {
        Ok(())
    }

    fn create(
        &self,
        _builder: Arc<Builder>,
        local: Arc<PeerInfo>,
    ) -> BoxFut<'static, PsResult<DynDirectory>> {
        Box::pin(async move { Ok(MemDirectory::create(local)) })
    }
}

/// Position of a record in the ring index.
type RingKey = (u32, PeerId);

fn ring_key(info: &PeerInfo) -> RingKey {
    (info.loc(), info.peer.clone())
}

/// The smallest possible id, used as the lower bound of a location.
fn min_id() -> PeerId {
    PeerId(Id(bytes::Bytes::new()))
}

/// In-memory [Directory].
pub struct MemDirectory {
    local: Arc<PeerInfo>,
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for MemDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemDirectory")
            .field("local", &self.local.peer)
            .finish()
    }
}

impl MemDirectory {
    /// Construct an empty directory for the given local peer.
    pub fn create(local: Arc<PeerInfo>) -> DynDirectory {
        let out: DynDirectory = Arc::new(Self {
            local,
            inner: Arc::new(Mutex::new(Inner::default())),
        });
        out
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock_inner(&self.inner)
    }
}

/// Lock the directory state, recovering it if a writer panicked.
///
/// An update cut short leaves at worst a ring index entry without a record,
/// which scans report as [PsError::Inconsistent].
fn lock_inner(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("recovering poisoned directory lock");
        inner.clear_poison();
        poisoned.into_inner()
    })
}

impl Directory for MemDirectory {
    fn connected_count(&self) -> usize {
        self.lock().peers.len()
    }

    fn local_peer(&self) -> Arc<PeerInfo> {
        self.local.clone()
    }

    fn scan(&self, opts: ScanOpts) -> PeerScan {
        Box::new(MemScan {
            inner: self.inner.clone(),
            local: opts.include_self.then(|| self.local.clone()),
            opts,
            last: None,
            done: false,
        })
    }

    fn get_connected(&self, peer: &PeerId) -> PsResult<Option<Arc<PeerInfo>>> {
        Ok(self.lock().peers.get(peer).cloned())
    }

    fn insert(&self, peer_list: Vec<Arc<PeerInfo>>) -> PsResult<()> {
        let mut inner = self.lock();
        for info in peer_list {
            // the local peer is never part of the connected set
            if info.peer == self.local.peer {
                continue;
            }
            inner.insert(info);
        }
        Ok(())
    }

    fn remove(&self, peer: &PeerId) {
        self.lock().remove(peer);
    }

    fn reset_active_set(&self) {
        self.lock().rebuild_index();
    }
}

#[derive(Default)]
struct Inner {
    peers: HashMap<PeerId, Arc<PeerInfo>>,
    index: BTreeSet<RingKey>,
}

impl Inner {
    fn insert(&mut self, info: Arc<PeerInfo>) {
        if let Some(cur) = self.peers.get(&info.peer) {
            // If we already have a newer one, abort.
            if cur.last_seen > info.last_seen {
                return;
            }
        }

        self.index.insert(ring_key(&info));
        self.peers.insert(info.peer.clone(), info);
    }

    fn remove(&mut self, peer: &PeerId) {
        if let Some(info) = self.peers.remove(peer) {
            self.index.remove(&ring_key(&info));
        }
    }

    fn rebuild_index(&mut self) {
        let before = self.index.len();
        self.index = self.peers.values().map(|i| ring_key(i)).collect();
        tracing::info!(
            before,
            after = self.index.len(),
            "rebuilt directory ring index"
        );
    }

    /// The next index key strictly beyond `last` in scan direction, or the
    /// first one at the scan start if nothing was yielded yet.
    fn next_key(
        &self,
        opts: &ScanOpts,
        last: Option<&RingKey>,
    ) -> Option<RingKey> {
        let found = match (opts.order, last) {
            (ScanOrder::Ascending, Some(last)) => self
                .index
                .range((Bound::Excluded(last), Bound::Unbounded))
                .next(),
            (ScanOrder::Ascending, None) => match opts.start {
                Some(s) => self.index.range((s, min_id())..).next(),
                None => self.index.iter().next(),
            },
            (ScanOrder::Descending, Some(last)) => self
                .index
                .range((Bound::Unbounded, Bound::Excluded(last)))
                .next_back(),
            (ScanOrder::Descending, None) => {
                match opts.start.and_then(|s| s.checked_add(1)) {
                    Some(s) => self.index.range(..(s, min_id())).next_back(),
                    None => self.index.iter().next_back(),
                }
            }
        };
        found.cloned()
    }
}

/// Lazy cursor over a [MemDirectory]. It re-queries the ring index on
/// every step, so it observes concurrent inserts and removals.
struct MemScan {
    inner: Arc<Mutex<Inner>>,
    local: Option<Arc<PeerInfo>>,
    opts: ScanOpts,
    last: Option<RingKey>,
    done: bool,
}

impl MemScan {
    /// Whether `key` still lies ahead of the cursor.
    fn ahead(&self, key: &RingKey) -> bool {
        match (self.opts.order, &self.last, self.opts.start) {
            (ScanOrder::Ascending, Some(last), _) => key > last,
            (ScanOrder::Ascending, None, Some(s)) => key.0 >= s,
            (ScanOrder::Descending, Some(last), _) => key < last,
            (ScanOrder::Descending, None, Some(s)) => key.0 <= s,
            (_, None, None) => true,
        }
    }

    /// Whether `a` comes before `b` in scan direction.
    fn before(&self, a: &RingKey, b: &RingKey) -> bool {
        match self.opts.order {
            ScanOrder::Ascending => a < b,
            ScanOrder::Descending => a > b,
        }
    }

    fn step(&mut self) -> PsResult<Option<Arc<PeerInfo>>> {
        loop {
            let local_key = self
                .local
                .as_ref()
                .map(|l| ring_key(l))
                .filter(|k| self.ahead(k));

            let (key, info) = {
                let inner = lock_inner(&self.inner);
                let index_key = inner.next_key(&self.opts, self.last.as_ref());
                match (index_key, local_key) {
                    (None, None) => return Ok(None),
                    (Some(i), Some(l)) if !self.before(&i, &l) => {
                        let local = self.local.take();
                        (l, local)
                    }
                    (None, Some(l)) => {
                        let local = self.local.take();
                        (l, local)
                    }
                    (Some(i), _) => match inner.peers.get(&i.1) {
                        Some(info) => {
                            let info = info.clone();
                            (i, Some(info))
                        }
                        None => {
                            return Err(PsError::inconsistent(format!(
                                "ring index entry {} has no record",
                                i.1
                            )));
                        }
                    },
                }
            };

            self.last = Some(key);
            if let Some(info) = info {
                if info.version >= self.opts.min_version {
                    return Ok(Some(info));
                }
            }
        }
    }
}

impl Iterator for MemScan {
    type Item = PsResult<Arc<PeerInfo>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(info)) => Some(Ok(info)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
