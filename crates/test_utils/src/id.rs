//! Test utilities associated with ids.

use bytes::Bytes;
use peersel_api::{id::Id, DocId, PeerId, TermId};

use crate::random_bytes;

/// Create a random id.
pub fn random_id() -> Id {
    Id(Bytes::from(random_bytes(32)))
}

/// Create a random peer id.
pub fn random_peer_id() -> PeerId {
    PeerId(random_id())
}

/// Create a random term id.
pub fn random_term_id() -> TermId {
    TermId(random_id())
}

/// Create a random doc id.
pub fn random_doc_id() -> DocId {
    DocId(random_id())
}

/// A peer id located exactly at `loc`.
///
/// A non-zero `tag` appends itself twice, which cancels out of the xor fold,
/// so several distinct peers can share one location.
pub fn peer_id_at(loc: u32, tag: u32) -> PeerId {
    let mut b = Vec::with_capacity(12);
    b.extend_from_slice(&loc.to_le_bytes());
    if tag != 0 {
        b.extend_from_slice(&tag.to_le_bytes());
        b.extend_from_slice(&tag.to_le_bytes());
    }
    PeerId(Id(Bytes::from(b)))
}

/// A term id whose plain location is exactly `loc`.
pub fn term_id_at(loc: u32) -> TermId {
    TermId(Id::from_loc(loc))
}

/// A doc id whose location is exactly `loc`.
pub fn doc_id_at(loc: u32) -> DocId {
    DocId(Id::from_loc(loc))
}
