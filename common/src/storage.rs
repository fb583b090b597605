// Storage Layer
// Well-known storage items of the simulated chain and their key derivation.
//
// Storage Key Structure:
// - Plain value:  blake3_128(pallet) ++ blake3_128(item)
// - Map entry:    blake3_128(pallet) ++ blake3_128(item) ++ blake3_128(arg) ++ arg
//
// `arg` is the canonical encoding of the map key, so the argument of any
// entry can be recovered from its storage key.

use crate::{
    block::BlockNumber,
    crypto::Hash,
    referenda::ReferendumIndex,
    scheduler::TaskName,
    serializer::{ReaderError, Serializer},
};

/// Length of each hashed key segment
pub const SEGMENT_SIZE: usize = 16;

/// Length of a storage item prefix
pub const PREFIX_SIZE: usize = SEGMENT_SIZE * 2;

/// A storage item: a plain value or a map, addressed by pallet and item name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageItem {
    pub pallet: &'static str,
    pub item: &'static str,
}

/// Storage items read and written by the fast-forward engine and the test chain
pub mod prefixes {
    use super::StorageItem;

    /// Current block number
    pub const SYSTEM_NUMBER: StorageItem = StorageItem::new("System", "Number");

    /// Total token issuance, the support denominator
    pub const TOTAL_ISSUANCE: StorageItem = StorageItem::new("Balances", "TotalIssuance");

    /// Agenda slot per block number
    pub const AGENDA: StorageItem = StorageItem::new("Scheduler", "Agenda");

    /// Task name to `(slot, position)`
    pub const LOOKUP: StorageItem = StorageItem::new("Scheduler", "Lookup");

    /// Preimage bytes per `(hash, len)`
    pub const PREIMAGE_FOR: StorageItem = StorageItem::new("Preimage", "PreimageFor");

    /// Preimage length per hash, used to resolve legacy descriptors
    pub const REQUEST_STATUS_FOR: StorageItem = StorageItem::new("Preimage", "RequestStatusFor");

    /// Next referendum index
    pub const REFERENDUM_COUNT: StorageItem = StorageItem::new("Referenda", "ReferendumCount");

    /// Referendum state per index
    pub const REFERENDUM_INFO_FOR: StorageItem =
        StorageItem::new("Referenda", "ReferendumInfoFor");
}

fn segment(name: &[u8]) -> [u8; SEGMENT_SIZE] {
    let mut out = [0u8; SEGMENT_SIZE];
    out.copy_from_slice(&blake3::hash(name).as_bytes()[..SEGMENT_SIZE]);
    out
}

impl StorageItem {
    pub const fn new(pallet: &'static str, item: &'static str) -> Self {
        Self { pallet, item }
    }

    /// Key of a plain value, also the common prefix of all map entries
    pub fn prefix(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(PREFIX_SIZE);
        key.extend_from_slice(&segment(self.pallet.as_bytes()));
        key.extend_from_slice(&segment(self.item.as_bytes()));
        key
    }

    /// Key of a map entry given the encoded map key
    pub fn key(&self, arg: &[u8]) -> Vec<u8> {
        let mut key = Vec::with_capacity(PREFIX_SIZE + SEGMENT_SIZE + arg.len());
        key.extend_from_slice(&self.prefix());
        key.extend_from_slice(&segment(arg));
        key.extend_from_slice(arg);
        key
    }

    /// Key of a map entry given a typed map key
    pub fn key_for<K: Serializer>(&self, arg: &K) -> Vec<u8> {
        self.key(&arg.to_bytes())
    }

    /// Recover the typed map key from a full storage key of this item
    pub fn decode_key<K: Serializer>(&self, key: &[u8]) -> Result<K, ReaderError> {
        let prefix = self.prefix();
        if key.len() < PREFIX_SIZE + SEGMENT_SIZE || !key.starts_with(&prefix) {
            return Err(ReaderError::InvalidSize {
                needed: PREFIX_SIZE + SEGMENT_SIZE,
                left: key.len(),
            });
        }

        K::from_bytes(&key[PREFIX_SIZE + SEGMENT_SIZE..])
    }
}

/// Generate storage key for the current block number
pub fn block_number_key() -> Vec<u8> {
    prefixes::SYSTEM_NUMBER.prefix()
}

/// Generate storage key for the total issuance
pub fn total_issuance_key() -> Vec<u8> {
    prefixes::TOTAL_ISSUANCE.prefix()
}

/// Generate storage key for an agenda slot
pub fn agenda_key(slot: BlockNumber) -> Vec<u8> {
    prefixes::AGENDA.key_for(&slot)
}

/// Generate storage key for a named task lookup
pub fn lookup_key(name: &TaskName) -> Vec<u8> {
    prefixes::LOOKUP.key_for(name)
}

/// Generate storage key for preimage bytes
pub fn preimage_key(hash: &Hash, len: u32) -> Vec<u8> {
    prefixes::PREIMAGE_FOR.key_for(&(hash.clone(), len))
}

/// Generate storage key for a preimage request status
pub fn request_status_key(hash: &Hash) -> Vec<u8> {
    prefixes::REQUEST_STATUS_FOR.key_for(hash)
}

/// Generate storage key for the referendum counter
pub fn referendum_count_key() -> Vec<u8> {
    prefixes::REFERENDUM_COUNT.prefix()
}

/// Generate storage key for a referendum
pub fn referendum_info_key(index: ReferendumIndex) -> Vec<u8> {
    prefixes::REFERENDUM_INFO_FOR.key_for(&index)
}
