//! Types dealing with peer and content identity.

macro_rules! imp_deref {
    ($i:ty, $t:ty) => {
        impl std::ops::Deref for $i {
            type Target = $t;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }
    };
}

macro_rules! imp_from {
    ($a:ty, $b:ty, $i:ident => $e:expr) => {
        impl From<$b> for $a {
            fn from($i: $b) -> Self {
                $e
            }
        }
    };
}

/// Newtype an [Id] with base64 display and debug output.
macro_rules! imp_id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Id);

        imp_deref!($name, Id);
        imp_from!($name, bytes::Bytes, b => $name(Id(b)));
        imp_from!($name, Id, b => $name(b));

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                display(&self.0 .0, f)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                display(&self.0 .0, f)
            }
        }
    };
}

/// Base identity type meant for newtyping.
/// You probably want [PeerId], [TermId] or [DocId].
///
/// These bytes should ONLY be the actual hash bytes of the identity
/// being tracked, without prefix or suffix.
#[derive(
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Id(#[serde(with = "crate::serde_bytes_base64")] pub bytes::Bytes);

imp_deref!(Id, bytes::Bytes);
imp_from!(Id, bytes::Bytes, b => Id(b));

impl Id {
    /// Get the ring location of this Id.
    ///
    /// Every successive 4 bytes of the hash are xor-ed together. It is okay
    /// if the hash len is not a multiple of 4, it will stop with the ending
    /// byte of the hash. The remaining 4 bytes are interpreted as a
    /// little-endian u32.
    pub fn loc(&self) -> u32 {
        let mut out = [0_u8; 4];
        for (i, b) in self.0.iter().enumerate() {
            out[i % 4] ^= b;
        }
        u32::from_le_bytes(out)
    }

    /// The canonical 4-byte Id whose [Id::loc] is exactly `loc`.
    pub fn from_loc(loc: u32) -> Self {
        Self(bytes::Bytes::copy_from_slice(&loc.to_le_bytes()))
    }
}

/// Ids are printed as url-safe base64, which makes debugging so much
/// easier than rust's default of decimal array.
fn display(
    b: &bytes::Bytes,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    use base64::prelude::*;
    f.write_str(&BASE64_URL_SAFE_NO_PAD.encode(b))
}

imp_id_newtype!(
    /// Identifies a member peer of the directory.
    PeerId
);

imp_id_newtype!(
    /// Identifies a content key, i.e. the hash of an indexed term.
    TermId
);

imp_id_newtype!(
    /// Identifies a document. Used to salt a [TermId] into one of its
    /// vertical ring partitions.
    DocId
);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn loc_zero_is_zero() {
        assert_eq!(0, Id(bytes::Bytes::from_static(b"")).loc());
    }

    #[test]
    fn loc_u32_equality() {
        for u in [0, 42, 999, u32::MAX / 13, u32::MAX / 4, u32::MAX] {
            assert_eq!(
                u,
                Id(bytes::Bytes::copy_from_slice(&u.to_le_bytes())).loc()
            );
            assert_eq!(u, Id::from_loc(u).loc());
        }
    }

    #[test]
    fn loc_fixtures() {
        const F: &[(&[u8], u32)] = &[
            (b"hello", 1819043079),
            (b"1", 49),
            (&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff], 4294901760),
            (&[1, 2, 3, 230, 44, 77, 99, 82], 3026210605),
            (&[42, 0, 0, 0, 99, 0, 0, 0], 73),
        ];

        for (b, res) in F.iter() {
            assert_eq!(*res, Id(bytes::Bytes::from_static(b)).loc());
        }
    }

    #[test]
    fn id_display_is_base64() {
        let p = PeerId::from(bytes::Bytes::from_static(b"test-hash-1"));
        assert_eq!("dGVzdC1oYXNoLTE", p.to_string());
        assert_eq!("dGVzdC1oYXNoLTE", format!("{p:?}"));
    }

    #[test]
    fn id_serde_fixtures() {
        const F: &[(&[u8], &str)] = &[
            (b"test-hash-1", "\"dGVzdC1oYXNoLTE\""),
            (b"s", "\"cw\""),
            (&[255, 255, 255, 255, 255, 255, 255], "\"_________w\""),
        ];

        for (d, e) in F.iter() {
            let r = serde_json::to_string(&Id(bytes::Bytes::from_static(d)))
                .unwrap();
            assert_eq!(e, &r);
            let r: PeerId = serde_json::from_str(e).unwrap();
            assert_eq!(d, &r.0 .0);
        }
    }
}
