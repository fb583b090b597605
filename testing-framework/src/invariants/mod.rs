//! Core invariant checkers
//!
//! Whole-state scans of the scheduler:
//! - Named lookup consistency (every named task is addressable by name)
//! - Slot capacity

use std::collections::BTreeMap;

use anyhow::{bail, Result};

use gov_common::{
    crypto::Hash,
    scheduler::{TaskAddress, TaskName, MAX_SCHEDULED_PER_BLOCK},
};

use crate::{backend::StorageBackend, fast_forward::AgendaStore};

/// Check that `Lookup[name] == (slot, position)` for every named task and
/// that every lookup entry points at a task carrying that name
pub async fn check_lookup_consistency<B: StorageBackend + ?Sized>(backend: &B) -> Result<()> {
    let agenda = AgendaStore::new(backend);

    let mut named: BTreeMap<TaskName, TaskAddress> = BTreeMap::new();
    for (slot, tasks) in agenda.entries().await? {
        for (position, task) in tasks.iter().enumerate() {
            let Some(name) = task.as_ref().and_then(|task| task.name()) else {
                continue;
            };
            let address = (slot, position as u32);
            if let Some(previous) = named.insert(*name, address) {
                bail!(
                    "task name {} used at both {:?} and {:?}",
                    Hash::new(*name),
                    previous,
                    address
                );
            }
        }
    }

    let lookups: BTreeMap<TaskName, TaskAddress> = agenda.lookups().await?.into_iter().collect();
    for (name, address) in &named {
        match lookups.get(name) {
            Some(found) if found == address => {}
            found => bail!(
                "task {} is at {:?} but its lookup points at {:?}",
                Hash::new(*name),
                address,
                found
            ),
        }
    }
    for (name, address) in &lookups {
        if !named.contains_key(name) {
            bail!(
                "lookup for {} points at {:?} where no such task exists",
                Hash::new(*name),
                address
            );
        }
    }
    Ok(())
}

/// Check that no agenda slot holds more tasks than the scheduler accepts
pub async fn check_slot_capacity<B: StorageBackend + ?Sized>(backend: &B) -> Result<()> {
    for (slot, tasks) in AgendaStore::new(backend).entries().await? {
        let count = tasks.iter().flatten().count();
        if count > MAX_SCHEDULED_PER_BLOCK {
            bail!("agenda slot {} holds {} tasks", slot, count);
        }
    }
    Ok(())
}
