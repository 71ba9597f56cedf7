//! Configuration of the selection engine itself.

use crate::*;

/// Configuration parameters for the selection engine.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectorConfig {
    /// The ring is split into `2^partition_exponent` vertical partitions,
    /// one replica set is selected per partition.
    ///
    /// Default: 4.
    pub partition_exponent: u8,

    /// Hard cap on the peers taken from one vertical position, no matter
    /// how much redundancy is requested.
    ///
    /// Default: 3.
    pub max_targets_per_position: u32,

    /// How many directory entries the age ranking looks at.
    ///
    /// Default: 1000.
    pub age_scan_limit: u32,

    /// How many identities a single enumeration may remember for
    /// deduplication.
    ///
    /// Default: 4096.
    pub dedup_capacity: u32,

    /// Minimum protocol version of index targets.
    ///
    /// Default: [ProtocolVersion::HANDLES_COLLECTION_INDEX].
    pub index_min_version: ProtocolVersion,

    /// Minimum protocol version of remote crawl providers.
    ///
    /// Default: [ProtocolVersion::PROVIDES_REMOTE_CRAWL_LISTS].
    pub crawl_min_version: ProtocolVersion,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            partition_exponent: RingScheme::DEFAULT_PARTITION_EXPONENT,
            max_targets_per_position: 3,
            age_scan_limit: 1000,
            dedup_capacity: 4096,
            index_min_version: ProtocolVersion::HANDLES_COLLECTION_INDEX,
            crawl_min_version: ProtocolVersion::PROVIDES_REMOTE_CRAWL_LISTS,
        }
    }
}

impl SelectorConfig {
    /// The ring scheme these parameters describe.
    pub fn scheme(&self) -> PsResult<RingScheme> {
        RingScheme::new(self.partition_exponent)
    }

    /// Check the parameters for values the engine cannot work with.
    pub fn validate(&self) -> PsResult<()> {
        self.scheme()?;
        if self.dedup_capacity == 0 {
            return Err(PsError::other("dedupCapacity must be > 0"));
        }
        Ok(())
    }
}

/// Module-level configuration for the selection engine.
#[derive(Debug, Default, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorModConfig {
    /// Selection engine configuration.
    #[serde(default)]
    pub selector: SelectorConfig,
}

impl ModConfig for SelectorModConfig {}
