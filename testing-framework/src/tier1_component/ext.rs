// Execution context of one block: typed storage access and event sink.
//
// Writes made inside `with_transaction` are journaled and undone, together
// with the events deposited meanwhile, when the closure returns `Err`.

use std::collections::BTreeMap;

use gov_common::{
    block::BlockNumber, error::DispatchError, event::RuntimeEvent, referenda::Tracks,
    serializer::Serializer,
};

use crate::backend::{StorageKey, StorageValue};

pub type DispatchResult = Result<(), DispatchError>;

pub(crate) struct Ext<'a> {
    storage: &'a mut BTreeMap<StorageKey, StorageValue>,
    events: &'a mut Vec<RuntimeEvent>,
    /// Previous values of keys written inside an open transaction
    journal: Vec<(StorageKey, Option<StorageValue>)>,
    depth: usize,
    pub tracks: &'a Tracks,
    pub now: BlockNumber,
}

impl<'a> Ext<'a> {
    pub fn new(
        storage: &'a mut BTreeMap<StorageKey, StorageValue>,
        events: &'a mut Vec<RuntimeEvent>,
        tracks: &'a Tracks,
        now: BlockNumber,
    ) -> Self {
        Self {
            storage,
            events,
            journal: Vec::new(),
            depth: 0,
            tracks,
            now,
        }
    }

    /// Run `f`, keeping its writes and events only if it succeeds
    pub fn with_transaction<R, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<R, E>) -> Result<R, E> {
        let journal_mark = self.journal.len();
        let events_mark = self.events.len();

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;

        if result.is_err() {
            for (key, previous) in self.journal.drain(journal_mark..).rev() {
                match previous {
                    Some(value) => self.storage.insert(key, value),
                    None => self.storage.remove(&key),
                };
            }
            if log::log_enabled!(log::Level::Trace) {
                log::trace!(
                    "block {}: rolled back {} events",
                    self.now,
                    self.events.len() - events_mark
                );
            }
            self.events.truncate(events_mark);
        } else if self.depth == 0 {
            self.journal.clear();
        }
        result
    }

    fn record(&mut self, key: &[u8]) {
        if self.depth > 0 {
            let previous = self.storage.get(key).cloned();
            self.journal.push((key.to_vec(), previous));
        }
    }

    pub fn get<T: Serializer>(&self, key: &[u8]) -> Result<Option<T>, DispatchError> {
        match self.storage.get(key) {
            Some(bytes) => T::from_bytes(bytes).map(Some).map_err(|e| {
                if log::log_enabled!(log::Level::Warn) {
                    log::warn!("undecodable storage value at {}: {}", hex::encode(key), e);
                }
                DispatchError::Undecodable
            }),
            None => Ok(None),
        }
    }

    pub fn get_raw(&self, key: &[u8]) -> Option<&StorageValue> {
        self.storage.get(key)
    }

    pub fn put<T: Serializer>(&mut self, key: StorageKey, value: &T) {
        self.put_raw(key, value.to_bytes());
    }

    pub fn put_raw(&mut self, key: StorageKey, value: StorageValue) {
        self.record(&key);
        self.storage.insert(key, value);
    }

    pub fn remove(&mut self, key: &[u8]) -> Option<StorageValue> {
        self.record(key);
        self.storage.remove(key)
    }

    pub fn deposit_event(&mut self, event: RuntimeEvent) {
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("block {} event {:?}", self.now, event);
        }
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gov_common::{crypto::hash, event::SystemEvent};

    fn remarked(bytes: &[u8]) -> RuntimeEvent {
        RuntimeEvent::System(SystemEvent::Remarked { hash: hash(bytes) })
    }

    #[test]
    fn test_failed_transaction_is_rolled_back() {
        let tracks = Tracks::default();
        let mut storage = BTreeMap::from([(b"kept".to_vec(), vec![1]), (b"changed".to_vec(), vec![2])]);
        let mut events = vec![remarked(b"before")];
        let mut ext = Ext::new(&mut storage, &mut events, &tracks, 5);

        let result: Result<(), DispatchError> = ext.with_transaction(|ext| {
            ext.put_raw(b"changed".to_vec(), vec![3]);
            ext.put_raw(b"changed".to_vec(), vec![4]);
            ext.put_raw(b"new".to_vec(), vec![5]);
            ext.remove(b"kept");
            ext.deposit_event(remarked(b"inside"));
            Err(DispatchError::NotFound)
        });
        assert_eq!(result, Err(DispatchError::NotFound));

        assert_eq!(events, vec![remarked(b"before")]);
        assert_eq!(
            storage,
            BTreeMap::from([(b"kept".to_vec(), vec![1]), (b"changed".to_vec(), vec![2])])
        );
    }

    #[test]
    fn test_nested_failure_keeps_outer_writes() {
        let tracks = Tracks::default();
        let mut storage = BTreeMap::new();
        let mut events = Vec::new();
        let mut ext = Ext::new(&mut storage, &mut events, &tracks, 5);

        let result: Result<(), DispatchError> = ext.with_transaction(|ext| {
            ext.put_raw(b"outer".to_vec(), vec![1]);
            let inner: Result<(), DispatchError> = ext.with_transaction(|ext| {
                ext.put_raw(b"inner".to_vec(), vec![2]);
                Err(DispatchError::BadOrigin)
            });
            assert!(inner.is_err());
            Ok(())
        });
        assert!(result.is_ok());
        assert!(ext.journal.is_empty());
        assert_eq!(storage, BTreeMap::from([(b"outer".to_vec(), vec![1])]));
    }
}
