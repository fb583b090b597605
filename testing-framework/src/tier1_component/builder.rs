use std::collections::{BTreeMap, BTreeSet};

use anyhow::{ensure, Context, Result};

use gov_common::{block::BlockNumber, referenda::Tracks, serializer::Serializer, storage};

use super::TestChain;
use crate::backend::{StorageKey, StorageValue};

/// Default total issuance of a fresh test chain
pub const DEFAULT_TOTAL_ISSUANCE: u128 = 1_000_000;

/// Builder for [`TestChain`]
///
/// ```rust,ignore
/// let chain = TestChainBuilder::new()
///     .with_total_issuance(1_000_000)
///     .with_block_number(10)
///     .build()
///     .await?;
/// ```
pub struct TestChainBuilder {
    tracks: Tracks,
    total_issuance: u128,
    block_number: BlockNumber,
    storage: Vec<(StorageKey, StorageValue)>,
}

impl Default for TestChainBuilder {
    fn default() -> Self {
        Self {
            tracks: Tracks::default(),
            total_issuance: DEFAULT_TOTAL_ISSUANCE,
            block_number: 1,
            storage: Vec::new(),
        }
    }
}

impl TestChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tracks(mut self, tracks: Tracks) -> Self {
        self.tracks = tracks;
        self
    }

    /// Load the track table from YAML (a list of track definitions)
    pub fn with_tracks_yaml(mut self, yaml: &str) -> Result<Self> {
        self.tracks = serde_yaml::from_str(yaml).context("parsing track table")?;
        Ok(self)
    }

    pub fn with_total_issuance(mut self, total_issuance: u128) -> Self {
        self.total_issuance = total_issuance;
        self
    }

    pub fn with_block_number(mut self, block_number: BlockNumber) -> Self {
        self.block_number = block_number;
        self
    }

    /// Seed a raw storage entry
    pub fn with_storage(mut self, key: StorageKey, value: StorageValue) -> Self {
        self.storage.push((key, value));
        self
    }

    pub async fn build(self) -> Result<TestChain> {
        ensure!(self.tracks.iter().next().is_some(), "track table is empty");

        let mut ids = BTreeSet::new();
        let mut origins = Vec::new();
        for track in self.tracks.iter() {
            ensure!(ids.insert(track.id), "duplicate track id {}", track.id);
            ensure!(
                !origins.contains(&&track.origin),
                "track {} reuses origin {:?}",
                track.name,
                track.origin
            );
            ensure!(
                track.decision_period > 0,
                "track {} has no decision period",
                track.name
            );
            origins.push(&track.origin);
        }

        let mut storage = BTreeMap::new();
        storage.insert(storage::block_number_key(), self.block_number.to_bytes());
        storage.insert(storage::total_issuance_key(), self.total_issuance.to_bytes());
        storage.extend(self.storage);

        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "test chain at block {} with {} tracks, total issuance {}",
                self.block_number,
                ids.len(),
                self.total_issuance
            );
        }
        Ok(TestChain::new(self.tracks, storage))
    }
}
