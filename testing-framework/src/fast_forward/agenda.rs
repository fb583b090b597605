// Agenda Store
//
// Typed access to the scheduler's persisted state through the storage
// backend. Nothing is cached: every read reflects the chain's current state.

use log::{debug, trace};

use gov_common::{
    block::BlockNumber,
    scheduler::{AgendaSlot, CallDescriptor, Scheduled, TaskAddress, TaskName},
    serializer::Serializer,
    storage::{self, prefixes},
};

use super::error::{FastForwardError, Result};
use crate::backend::{StorageBackend, StorageKey, StorageValue};

/// A task as found in the agenda
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub slot: BlockNumber,
    pub position: u32,
    pub scheduled: Scheduled,
}

impl Task {
    pub fn address(&self) -> TaskAddress {
        (self.slot, self.position)
    }

    pub fn call(&self) -> &CallDescriptor {
        &self.scheduled.call
    }

    pub fn name(&self) -> Option<&TaskName> {
        self.scheduled.name()
    }
}

pub struct AgendaStore<'a, B: StorageBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: StorageBackend + ?Sized> AgendaStore<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &'a B {
        self.backend
    }

    /// Current block number of the chain
    pub async fn current_block(&self) -> Result<BlockNumber> {
        match self.backend.read_storage(&storage::block_number_key()).await? {
            Some(bytes) => BlockNumber::from_bytes(&bytes)
                .map_err(|e| FastForwardError::decode("block number", None, e)),
            None => Ok(0),
        }
    }

    /// Read an agenda slot. A missing slot is empty.
    pub async fn read_slot(&self, slot: BlockNumber) -> Result<AgendaSlot> {
        match self.backend.read_storage(&storage::agenda_key(slot)).await? {
            Some(bytes) => decode_slot(slot, &bytes),
            None => Ok(Vec::new()),
        }
    }

    /// Persist a whole slot in one write
    pub async fn write_slot(&self, slot: BlockNumber, tasks: &AgendaSlot) -> Result<()> {
        self.write_slots(&[(slot, tasks)]).await
    }

    /// Persist several slots in one write
    pub async fn write_slots(&self, slots: &[(BlockNumber, &AgendaSlot)]) -> Result<()> {
        let entries: Vec<(StorageKey, StorageValue)> = slots
            .iter()
            .map(|(slot, tasks)| (storage::agenda_key(*slot), tasks.to_bytes()))
            .collect();

        if log::log_enabled!(log::Level::Trace) {
            trace!(
                "writing agenda slots {:?}",
                slots.iter().map(|(slot, _)| *slot).collect::<Vec<_>>()
            );
        }
        self.backend.write_storage(entries).await?;
        Ok(())
    }

    pub async fn read_lookup(&self, name: &TaskName) -> Result<Option<TaskAddress>> {
        match self.backend.read_storage(&storage::lookup_key(name)).await? {
            Some(bytes) => TaskAddress::from_bytes(&bytes)
                .map(Some)
                .map_err(|e| FastForwardError::decode("task lookup", None, e)),
            None => Ok(None),
        }
    }

    pub async fn write_lookup(&self, name: &TaskName, address: TaskAddress) -> Result<()> {
        self.backend
            .write_storage(vec![(storage::lookup_key(name), address.to_bytes())])
            .await?;
        Ok(())
    }

    /// Append a task to a slot, returning its position.
    /// Named tasks get their lookup entry written after the slot.
    pub async fn append(&self, slot: BlockNumber, scheduled: Scheduled) -> Result<u32> {
        let mut tasks = self.read_slot(slot).await?;
        let position = tasks.len() as u32;
        let name = scheduled.maybe_id;
        tasks.push(Some(scheduled));
        self.write_slot(slot, &tasks).await?;

        if let Some(name) = name {
            self.write_lookup(&name, (slot, position)).await?;
        }

        if log::log_enabled!(log::Level::Debug) {
            debug!("appended task to slot {} at position {}", slot, position);
        }
        Ok(position)
    }

    /// All persisted agenda slots, ordered by slot
    pub async fn entries(&self) -> Result<Vec<(BlockNumber, AgendaSlot)>> {
        let raw = self
            .backend
            .read_prefix(&prefixes::AGENDA.prefix())
            .await?;

        let mut slots = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            let slot: BlockNumber = prefixes::AGENDA
                .decode_key(&key)
                .map_err(|e| FastForwardError::decode("agenda key", None, e))?;
            slots.push((slot, decode_slot(slot, &value)?));
        }
        // Keys are ordered by hashed argument, not by slot
        slots.sort_by_key(|(slot, _)| *slot);
        Ok(slots)
    }

    /// All named tasks registered in the lookup table
    pub async fn lookups(&self) -> Result<Vec<(TaskName, TaskAddress)>> {
        let raw = self
            .backend
            .read_prefix(&prefixes::LOOKUP.prefix())
            .await?;

        raw.into_iter()
            .map(|(key, value)| {
                let name: TaskName = prefixes::LOOKUP
                    .decode_key(&key)
                    .map_err(|e| FastForwardError::decode("lookup key", None, e))?;
                let address = TaskAddress::from_bytes(&value)
                    .map_err(|e| FastForwardError::decode("task lookup", None, e))?;
                Ok((name, address))
            })
            .collect()
    }
}

fn decode_slot(slot: BlockNumber, bytes: &[u8]) -> Result<AgendaSlot> {
    AgendaSlot::from_bytes(bytes).map_err(|e| FastForwardError::decode("agenda slot", Some(slot), e))
}
