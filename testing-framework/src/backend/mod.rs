// File: testing-framework/src/backend/mod.rs
//
// Storage Backend Seam
//
// The fast-forward engine talks to a simulated chain through raw storage
// reads and writes, block production and event queries only. Any node that
// exposes these primitives (in-process test chain, RPC client) can be driven.

mod memory;

pub use memory::MemoryBackend;

use anyhow::Result;
use async_trait::async_trait;

use gov_common::event::RuntimeEvent;

/// A raw storage key
pub type StorageKey = Vec<u8>;

/// A raw storage value
pub type StorageValue = Vec<u8>;

/// Primitive operations of a simulated chain.
///
/// Every method is one bounded round-trip. The engine never calls two
/// methods concurrently, and the chain only progresses inside
/// [`produce_block`](StorageBackend::produce_block).
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read one storage value.
    ///
    /// # Errors
    ///
    /// Returns an error if the chain is unreachable or the query fails.
    async fn read_storage(&self, key: &[u8]) -> Result<Option<StorageValue>>;

    /// Read every entry whose key starts with `prefix`, ordered by key.
    async fn read_prefix(&self, prefix: &[u8]) -> Result<Vec<(StorageKey, StorageValue)>>;

    /// Write a batch of raw entries. The batch is applied as a whole.
    async fn write_storage(&self, entries: Vec<(StorageKey, StorageValue)>) -> Result<()>;

    /// Produce `count` blocks, executing whatever the chain has due.
    async fn produce_block(&self, count: u32) -> Result<()>;

    /// Events emitted in the most recently produced block.
    async fn query_events(&self) -> Result<Vec<RuntimeEvent>>;
}
