// Task Locator
//
// Predicate search over every non-empty agenda slot.

use log::debug;

use gov_common::{
    crypto::Hash,
    scheduler::{CallDescriptor, TaskAddress},
};

use super::{
    agenda::{AgendaStore, Task},
    error::{FastForwardError, Result},
};
use crate::backend::StorageBackend;

pub struct TaskLocator<'a, B: StorageBackend + ?Sized> {
    agenda: AgendaStore<'a, B>,
}

impl<'a, B: StorageBackend + ?Sized> TaskLocator<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self {
            agenda: AgendaStore::new(backend),
        }
    }

    /// Every task whose call satisfies `predicate`, ordered by `(slot, position)`.
    /// Holes are skipped.
    pub async fn find<P>(&self, predicate: P) -> Result<Vec<Task>>
    where
        P: Fn(&CallDescriptor) -> bool,
    {
        let mut found = Vec::new();
        for (slot, tasks) in self.agenda.entries().await? {
            for (position, scheduled) in tasks.into_iter().enumerate() {
                let Some(scheduled) = scheduled else {
                    continue;
                };
                if predicate(&scheduled.call) {
                    found.push(Task {
                        slot,
                        position: position as u32,
                        scheduled,
                    });
                }
            }
        }
        Ok(found)
    }

    /// Every task referencing the call with content hash `hash`
    pub async fn find_by_hash(&self, hash: &Hash) -> Result<Vec<Task>> {
        self.find(|call| &call.content_hash() == hash).await
    }

    /// The earliest task referencing `hash`
    pub async fn find_one(&self, hash: &Hash) -> Result<Task> {
        let mut found = self.find_by_hash(hash).await?;
        if found.len() > 1 && log::log_enabled!(log::Level::Debug) {
            debug!(
                "{} tasks reference call {}, using the earliest at {:?}",
                found.len(),
                hash,
                found[0].address()
            );
        }

        if found.is_empty() {
            return Err(FastForwardError::NoScheduledCallFound(hash.clone()));
        }
        Ok(found.swap_remove(0))
    }

    /// The single task referencing `hash` among the tasks at `addresses`.
    /// Tasks with the same call elsewhere in the agenda are ignored.
    pub async fn find_scheduled(&self, hash: &Hash, addresses: &[TaskAddress]) -> Result<Task> {
        let mut found: Vec<Task> = self
            .find_by_hash(hash)
            .await?
            .into_iter()
            .filter(|task| addresses.contains(&task.address()))
            .collect();

        match found.len() {
            0 => Err(FastForwardError::NoScheduledCallFound(hash.clone())),
            1 => Ok(found.swap_remove(0)),
            n => Err(FastForwardError::invariant(format!(
                "{} tasks at {:?} reference call {}",
                n, addresses, hash
            ))),
        }
    }
}
