#![deny(missing_docs)]
//! Peer selection API contains the collaborator traits and the basic types
//! required to select which member peers of a dht are responsible for a key.
//!
//! If you want the selection engine itself, please see the peersel_core
//! crate.

/// Boxed future type.
pub type BoxFut<'a, T> =
    std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

pub(crate) mod serde_bytes_base64 {
    pub fn serialize<S>(
        b: &bytes::Bytes,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use base64::prelude::*;
        serializer.serialize_str(&BASE64_URL_SAFE_NO_PAD.encode(b))
    }

    pub fn deserialize<'de, D, T: From<bytes::Bytes>>(
        deserializer: D,
    ) -> Result<T, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use base64::prelude::*;
        let s: std::borrow::Cow<'de, str> =
            serde::Deserialize::deserialize(deserializer)?;
        BASE64_URL_SAFE_NO_PAD
            .decode(s.as_bytes())
            .map(|v| bytes::Bytes::copy_from_slice(&v).into())
            .map_err(serde::de::Error::custom)
    }
}

pub mod builder;
pub use builder::*;

pub mod config;
pub use config::*;

pub mod directory;
pub use directory::*;

mod error;
pub use error::*;

pub mod id;
pub use id::{DocId, Id, PeerId, TermId};

pub mod peer;
pub use peer::*;

pub mod report;
pub use report::*;

pub mod ring;
pub use ring::RingScheme;

pub mod score;
pub use score::*;

pub mod seen;
pub use seen::*;

pub mod selector;
pub use selector::*;

mod timestamp;
pub use timestamp::*;
