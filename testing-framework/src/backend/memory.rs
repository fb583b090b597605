// Storage-only backend: a sorted key/value map with no chain logic.
// Producing a block only bumps `System::Number`.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;

use gov_common::{
    block::BlockNumber, event::RuntimeEvent, serializer::Serializer, storage::block_number_key,
};

use super::{StorageBackend, StorageKey, StorageValue};

#[derive(Debug, Default)]
pub struct MemoryBackend {
    storage: RwLock<BTreeMap<StorageKey, StorageValue>>,
    events: RwLock<Vec<RuntimeEvent>>,
    writes: RwLock<u64>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose `System::Number` is set to `number`
    pub fn at_block(number: BlockNumber) -> Self {
        let backend = Self::new();
        backend.insert(block_number_key(), number.to_bytes());
        backend
    }

    pub fn insert(&self, key: StorageKey, value: StorageValue) {
        self.storage.write().insert(key, value);
    }

    pub fn get(&self, key: &[u8]) -> Option<StorageValue> {
        self.storage.read().get(key).cloned()
    }

    /// Copy of the whole key space
    pub fn snapshot(&self) -> BTreeMap<StorageKey, StorageValue> {
        self.storage.read().clone()
    }

    /// Number of `write_storage` batches applied so far
    pub fn write_count(&self) -> u64 {
        *self.writes.read()
    }

    /// Events to report for the next `query_events`
    pub fn set_events(&self, events: Vec<RuntimeEvent>) {
        *self.events.write() = events;
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn read_storage(&self, key: &[u8]) -> Result<Option<StorageValue>> {
        Ok(self.get(key))
    }

    async fn read_prefix(&self, prefix: &[u8]) -> Result<Vec<(StorageKey, StorageValue)>> {
        let storage = self.storage.read();
        Ok(storage
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    async fn write_storage(&self, entries: Vec<(StorageKey, StorageValue)>) -> Result<()> {
        let mut storage = self.storage.write();
        for (key, value) in entries {
            storage.insert(key, value);
        }
        *self.writes.write() += 1;
        Ok(())
    }

    async fn produce_block(&self, count: u32) -> Result<()> {
        let key = block_number_key();
        let mut storage = self.storage.write();
        let current = match storage.get(&key) {
            Some(bytes) => BlockNumber::from_bytes(bytes)?,
            None => 0,
        };
        storage.insert(key, current.saturating_add(count).to_bytes());
        self.events.write().clear();
        Ok(())
    }

    async fn query_events(&self) -> Result<Vec<RuntimeEvent>> {
        Ok(self.events.read().clone())
    }
}
