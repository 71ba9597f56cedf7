//! Ring geometry.
//!
//! Content keys and peers are placed on a modular ring of `u32` locations.
//! Responsibility for a key is assigned by forward (clockwise) proximity on
//! this ring: the peers sitting at or after a key's location are the ones
//! expected to store it.
//!
//! A [RingScheme] additionally splits the ring into `2^partition_exponent`
//! equally sized vertical partitions. A key has one position in every
//! partition, at the same offset within each. A document id picks which
//! of those partitions a (key, document) pair lives in, so the postings of
//! one term end up spread over several independent replica sets.
//!
//! ```text
//! partition_exponent = 2, key offset = o
//!
//! |--o------|--o------|--o------|--o------|
//! 0                                       u32::MAX
//!  part 0    part 1    part 2    part 3
//! ```

use crate::*;

/// The largest location on the ring. The ring holds `RING_MAX + 1`
/// locations.
pub const RING_MAX: u32 = u32::MAX;

/// Forward ring distance from `from` to `to`.
///
/// This is `(to - from) mod (RING_MAX + 1)`. It is 0 only when
/// `from == to` and it is not symmetric: for `a != b`,
/// `distance(a, b) + distance(b, a) == RING_MAX + 1`.
pub fn distance(from: u32, to: u32) -> u32 {
    to.wrapping_sub(from)
}

/// Rank of an identity when walking the ring clockwise from `start`.
/// Lower ranks are visited first.
pub fn rank_from(start: u32, id: &Id) -> (u32, &Id) {
    (distance(start, id.loc()), id)
}

/// Maps keys onto ring positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingScheme {
    partition_exponent: u8,
}

impl Default for RingScheme {
    fn default() -> Self {
        Self {
            partition_exponent: Self::DEFAULT_PARTITION_EXPONENT,
        }
    }
}

impl RingScheme {
    /// Default partition exponent, giving 16 vertical partitions.
    pub const DEFAULT_PARTITION_EXPONENT: u8 = 4;

    /// Largest supported partition exponent.
    pub const MAX_PARTITION_EXPONENT: u8 = 16;

    /// Construct a scheme with `2^partition_exponent` vertical partitions.
    pub fn new(partition_exponent: u8) -> PsResult<Self> {
        if partition_exponent > Self::MAX_PARTITION_EXPONENT {
            return Err(PsError::other(format!(
                "partition exponent {partition_exponent} exceeds {}",
                Self::MAX_PARTITION_EXPONENT
            )));
        }
        Ok(Self { partition_exponent })
    }

    /// The configured partition exponent.
    pub fn partition_exponent(&self) -> u8 {
        self.partition_exponent
    }

    /// Number of vertical partitions.
    pub fn partition_count(&self) -> u32 {
        1 << self.partition_exponent
    }

    /// The vertical partition a salt selects: the top
    /// `partition_exponent` bits of its location.
    pub fn partition_of(&self, salt: &Id) -> u32 {
        match self.partition_exponent {
            0 => 0,
            e => salt.loc() >> (32 - e as u32),
        }
    }

    /// Position of `key` within the given vertical partition.
    pub fn vertical_position(&self, key: &Id, partition: u32) -> u32 {
        match self.partition_exponent {
            0 => key.loc(),
            e => {
                let e = e as u32;
                let offset = key.loc() >> e;
                let base = (partition as u64 % (1_u64 << e)) << (32 - e);
                base as u32 | offset
            }
        }
    }

    /// Position of `key` on the ring, optionally salted by a secondary id.
    ///
    /// Without a salt this is the plain location of the key. With a salt
    /// it is the key's position inside the partition the salt selects.
    pub fn position(&self, key: &Id, salt: Option<&Id>) -> u32 {
        match salt {
            None => key.loc(),
            Some(salt) => {
                self.vertical_position(key, self.partition_of(salt))
            }
        }
    }

    /// One position per vertical partition, in partition order.
    pub fn vertical_positions(&self, key: &Id) -> Vec<u32> {
        (0..self.partition_count())
            .map(|p| self.vertical_position(key, p))
            .collect()
    }

    /// A key-shaped value located exactly at `position`, used to seed an
    /// enumeration. This is not an inverse of [RingScheme::position]: many
    /// keys share a position and this picks the canonical 4-byte one.
    pub fn position_to_key(position: u32) -> TermId {
        TermId(Id::from_loc(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(loc: u32) -> Id {
        Id::from_loc(loc)
    }

    #[test]
    fn distance_fixtures() {
        type Dist = u32;
        const F: &[(Dist, u32, u32)] = &[
            (0, 0, 0),
            (0, u32::MAX, u32::MAX),
            (1, 0, 1),
            (u32::MAX, 1, 0),
            (1, u32::MAX, 0),
            (u32::MAX, 0, u32::MAX),
            (10, u32::MAX - 4, 5),
            (u32::MAX - 9, 5, u32::MAX - 4),
        ];

        for (dist, from, to) in F.iter() {
            assert_eq!(
                *dist,
                distance(*from, *to),
                "While checking the distance from {} to {}",
                from,
                to
            );
        }
    }

    #[test]
    fn distance_pairs_sum_to_ring_size() {
        let locs =
            [0, 1, 7, u32::MAX / 3, u32::MAX / 2, u32::MAX - 1, u32::MAX];
        for a in locs {
            assert_eq!(0, distance(a, a));
            for b in locs {
                if a == b {
                    continue;
                }
                assert_eq!(
                    RING_MAX as u64 + 1,
                    distance(a, b) as u64 + distance(b, a) as u64,
                    "a = {a}, b = {b}"
                );
            }
        }
    }

    #[test]
    fn rank_from_wraps() {
        let start = u32::MAX - 10;
        assert!(rank_from(start, &id(u32::MAX)) < rank_from(start, &id(0)));
        assert!(rank_from(start, &id(0)) < rank_from(start, &id(start - 1)));
        assert_eq!(0, rank_from(start, &id(start)).0);
    }

    #[test]
    fn rejects_oversized_exponent() {
        assert!(RingScheme::new(16).is_ok());
        assert!(RingScheme::new(17).is_err());
    }

    #[test]
    fn position_is_deterministic() {
        let s = RingScheme::default();
        let key = Id(bytes::Bytes::from_static(b"some-term-hash"));
        let salt = Id(bytes::Bytes::from_static(b"some-doc-hash"));
        assert_eq!(
            s.position(&key, Some(&salt)),
            s.position(&key, Some(&salt))
        );
        assert_eq!(key.loc(), s.position(&key, None));
    }

    #[test]
    fn exponent_zero_is_a_single_horizontal_position() {
        let s = RingScheme::new(0).unwrap();
        let key = id(123456);
        assert_eq!(vec![123456], s.vertical_positions(&key));
        assert_eq!(123456, s.position(&key, Some(&id(u32::MAX))));
    }

    #[test]
    fn vertical_positions_share_the_offset() {
        let s = RingScheme::new(2).unwrap();
        let key = id(0xA000_0004);
        let offset = 0xA000_0004_u32 >> 2;
        assert_eq!(
            vec![
                offset,
                0x4000_0000 | offset,
                0x8000_0000 | offset,
                0xC000_0000 | offset,
            ],
            s.vertical_positions(&key)
        );
    }

    #[test]
    fn salts_scatter_across_partitions() {
        let s = RingScheme::new(4).unwrap();
        let key = id(0x1234_5678);
        let mut seen = std::collections::HashSet::new();
        for p in 0..16_u32 {
            // the salt's top four bits pick the partition
            let salt = id((p << 28) | 0x0ABC);
            let pos = s.position(&key, Some(&salt));
            assert_eq!(p, pos >> 28);
            assert_eq!(s.vertical_position(&key, p), pos);
            seen.insert(pos);
        }
        assert_eq!(16, seen.len());
    }

    #[test]
    fn salted_positions_keep_relative_distance() {
        // a peer and a key salted by the same document land in the same
        // partition, at their partition-local offsets
        let s = RingScheme::new(4).unwrap();
        let salt = id(0x7000_0000);
        let key = id(0x0000_0100);
        let peer = id(0x0000_0200);
        let d = distance(
            s.position(&key, Some(&salt)),
            s.position(&peer, Some(&salt)),
        );
        assert_eq!(0x10, d);
    }

    #[test]
    fn position_to_key_locates_exactly() {
        for pos in [0, 1, u32::MAX / 5, u32::MAX] {
            assert_eq!(pos, RingScheme::position_to_key(pos).loc());
        }
    }
}
