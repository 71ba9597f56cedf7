#![deny(missing_docs)]
//! Peer selection engine for a dht based distributed search index.
//!
//! Given a content key, the [PeerSelector] decides which member peers of
//! the directory should store it and whether the local peer is one of
//! them. See the peersel_api crate for the collaborator traits.

use peersel_api::{builder::Builder, config::Config};

/// Construct a production-ready default builder.
///
/// - `directory` - The default directory is
///   [factories::MemDirectoryFactory].
/// - `report` - The default report is
///   [factories::CoreSelectionReportFactory].
pub fn default_builder() -> Builder {
    Builder {
        config: Config::default(),
        directory: factories::MemDirectoryFactory::create(),
        report: factories::CoreSelectionReportFactory::create(),
    }
}

pub mod factories;

pub mod filter;
pub mod merge;
pub mod ring_enum;

mod selector;
pub use selector::*;
