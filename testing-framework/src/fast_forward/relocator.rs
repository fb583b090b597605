// Task Relocator
//
// Moves one agenda task to another slot. The source position becomes a hole,
// the task is appended to the destination, and a named task gets its lookup
// entry rewritten once both slots are persisted.

use log::{debug, info};

use gov_common::{
    block::BlockNumber,
    crypto::Hash,
    scheduler::{AgendaSlot, TaskAddress},
};

use super::{
    agenda::{AgendaStore, Task},
    error::{FastForwardError, Result},
};
use crate::backend::StorageBackend;

pub struct TaskRelocator<'a, B: StorageBackend + ?Sized> {
    agenda: AgendaStore<'a, B>,
}

impl<'a, B: StorageBackend + ?Sized> TaskRelocator<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self {
            agenda: AgendaStore::new(backend),
        }
    }

    /// Move the task at `from` to the end of slot `to`.
    /// Returns the task at its new address.
    pub async fn relocate(&self, from: TaskAddress, to: BlockNumber) -> Result<Task> {
        let (source_slot, position) = from;
        let mut source = self.agenda.read_slot(source_slot).await?;
        let scheduled = source
            .get_mut(position as usize)
            .and_then(Option::take)
            .ok_or_else(|| FastForwardError::moved_task(from))?;
        let name = scheduled.maybe_id;

        // The same slot is read back only once so the hole and the append land together
        let (new_position, writes): (u32, Vec<(BlockNumber, AgendaSlot)>) = if source_slot == to {
            let new_position = source.len() as u32;
            source.push(Some(scheduled.clone()));
            (new_position, vec![(to, source)])
        } else {
            let mut destination = self.agenda.read_slot(to).await?;
            let new_position = destination.len() as u32;
            destination.push(Some(scheduled.clone()));
            (new_position, vec![(source_slot, source), (to, destination)])
        };

        let slots: Vec<(BlockNumber, &AgendaSlot)> =
            writes.iter().map(|(slot, tasks)| (*slot, tasks)).collect();
        self.agenda.write_slots(&slots).await?;

        if let Some(name) = &name {
            self.agenda.write_lookup(name, (to, new_position)).await?;
        }

        let task = Task {
            slot: to,
            position: new_position,
            scheduled,
        };
        self.verify(&task).await?;

        if log::log_enabled!(log::Level::Info) {
            info!(
                "relocated task {:?} from {:?} to {:?}",
                task.name().map(|name| Hash::new(*name).to_hex()),
                from,
                task.address()
            );
        }
        Ok(task)
    }

    // Re-read what was written: the destination must hold the task verbatim
    // and a named task's lookup must point at it.
    async fn verify(&self, task: &Task) -> Result<()> {
        let destination = self.agenda.read_slot(task.slot).await?;
        match destination.get(task.position as usize) {
            Some(Some(stored)) if stored == &task.scheduled => {}
            _ => {
                return Err(FastForwardError::invariant(format!(
                    "slot {} position {} does not hold the relocated task",
                    task.slot, task.position
                )))
            }
        }

        if let Some(name) = task.name() {
            let address = self.agenda.read_lookup(name).await?;
            if address != Some(task.address()) {
                return Err(FastForwardError::invariant(format!(
                    "lookup for {} points at {:?}, task is at {:?}",
                    Hash::new(*name),
                    address,
                    task.address()
                )));
            }
        }

        if log::log_enabled!(log::Level::Debug) {
            debug!("relocation of task at {:?} verified", task.address());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use gov_common::{
        origin::OriginCaller,
        scheduler::{CallDescriptor, Scheduled},
        serializer::Serializer,
    };

    fn named(byte: u8) -> Scheduled {
        Scheduled::named([byte; 32], CallDescriptor::inline(vec![byte]), OriginCaller::Root)
    }

    #[tokio::test]
    async fn test_relocate_named_task() {
        let backend = MemoryBackend::new();
        let store = AgendaStore::new(&backend);
        store.append(100, named(1)).await.unwrap();
        store.append(100, named(2)).await.unwrap();
        store.append(100, named(3)).await.unwrap();
        store.append(5, named(4)).await.unwrap();

        let before = store.read_slot(100).await.unwrap()[1].clone().unwrap();
        let task = TaskRelocator::new(&backend)
            .relocate((100, 1), 5)
            .await
            .unwrap();

        assert_eq!(task.address(), (5, 1));
        assert_eq!(task.scheduled.call.to_bytes(), before.call.to_bytes());
        assert_eq!(store.read_lookup(&[2; 32]).await.unwrap(), Some((5, 1)));

        let source = store.read_slot(100).await.unwrap();
        assert_eq!(source.len(), 3);
        assert!(source[1].is_none());
        assert_eq!(store.read_lookup(&[1; 32]).await.unwrap(), Some((100, 0)));
        assert_eq!(store.read_lookup(&[3; 32]).await.unwrap(), Some((100, 2)));
    }

    #[tokio::test]
    async fn test_relocate_within_same_slot() {
        let backend = MemoryBackend::new();
        let store = AgendaStore::new(&backend);
        store.append(7, named(1)).await.unwrap();
        store.append(7, named(2)).await.unwrap();

        let task = TaskRelocator::new(&backend)
            .relocate((7, 0), 7)
            .await
            .unwrap();

        assert_eq!(task.address(), (7, 2));
        let slot = store.read_slot(7).await.unwrap();
        assert!(slot[0].is_none());
        assert_eq!(slot[2].as_ref().and_then(Scheduled::name), Some(&[1; 32]));
        assert_eq!(store.read_lookup(&[1; 32]).await.unwrap(), Some((7, 2)));
    }

    #[tokio::test]
    async fn test_relocate_hole_fails() {
        let backend = MemoryBackend::new();
        let store = AgendaStore::new(&backend);
        store.write_slot(3, &vec![None]).await.unwrap();

        let err = TaskRelocator::new(&backend)
            .relocate((3, 0), 4)
            .await
            .unwrap_err();
        assert!(matches!(err, FastForwardError::InvariantViolation(_)));

        let err = TaskRelocator::new(&backend)
            .relocate((3, 9), 4)
            .await
            .unwrap_err();
        assert!(matches!(err, FastForwardError::InvariantViolation(_)));
    }

    #[tokio::test]
    async fn test_slots_written_in_one_batch() {
        let backend = MemoryBackend::new();
        let store = AgendaStore::new(&backend);
        store
            .write_slot(1, &vec![Some(Scheduled::new(
                CallDescriptor::inline(vec![9]),
                OriginCaller::Root,
            ))])
            .await
            .unwrap();
        let writes = backend.write_count();

        TaskRelocator::new(&backend).relocate((1, 0), 2).await.unwrap();
        // anonymous task: both slots in a single batch, no lookup write
        assert_eq!(backend.write_count(), writes + 1);
    }

    #[tokio::test]
    async fn test_relocate_legacy_reference() {
        let backend = MemoryBackend::new();
        let store = AgendaStore::new(&backend);
        let legacy = Scheduled::named(
            [8; 32],
            CallDescriptor::Legacy {
                hash: Hash::new([0x42; 32]),
            },
            OriginCaller::Root,
        );
        store.append(300, legacy.clone()).await.unwrap();

        let task = TaskRelocator::new(&backend)
            .relocate((300, 0), 2)
            .await
            .unwrap();
        assert_eq!(task.scheduled, legacy);
        assert_eq!(task.call().content_hash(), Hash::new([0x42; 32]));
        assert_eq!(store.read_lookup(&[8; 32]).await.unwrap(), Some((2, 0)));
    }
}
