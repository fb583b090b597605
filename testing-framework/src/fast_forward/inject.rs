// Call injection
//
// Dispatch any call with any origin by writing a task straight into the next
// block's agenda slot. The chain executes it while producing that block.

use log::debug;

use gov_common::{
    call::RuntimeCall,
    origin::OriginCaller,
    scheduler::{CallDescriptor, Scheduled, TaskAddress},
    serializer::Serializer,
    storage,
};

use super::{agenda::AgendaStore, error::Result};
use crate::backend::StorageBackend;

/// Schedule `call` inline for the next block
pub async fn schedule_inline_call_with_origin<B: StorageBackend + ?Sized>(
    backend: &B,
    call: &RuntimeCall,
    origin: OriginCaller,
) -> Result<TaskAddress> {
    schedule_with_origin(backend, CallDescriptor::inline(call.to_bytes()), origin).await
}

/// Note `call` as a preimage and schedule it by lookup for the next block
pub async fn schedule_lookup_call_with_origin<B: StorageBackend + ?Sized>(
    backend: &B,
    call: &RuntimeCall,
    origin: OriginCaller,
) -> Result<TaskAddress> {
    let bytes = call.to_bytes();
    let descriptor = CallDescriptor::lookup(&bytes);
    let hash = descriptor.content_hash();
    let len = bytes.len() as u32;

    backend
        .write_storage(vec![
            (storage::preimage_key(&hash, len), bytes),
            (storage::request_status_key(&hash), len.to_bytes()),
        ])
        .await?;

    schedule_with_origin(backend, descriptor, origin).await
}

async fn schedule_with_origin<B: StorageBackend + ?Sized>(
    backend: &B,
    descriptor: CallDescriptor,
    origin: OriginCaller,
) -> Result<TaskAddress> {
    let agenda = AgendaStore::new(backend);
    let slot = agenda.current_block().await?.saturating_add(1);

    if log::log_enabled!(log::Level::Debug) {
        debug!(
            "injecting call {} with origin {:?} at block {}",
            descriptor.content_hash(),
            origin,
            slot
        );
    }

    let position = agenda
        .append(slot, Scheduled::new(descriptor, origin))
        .await?;
    Ok((slot, position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    #[tokio::test]
    async fn test_inline_injection_targets_next_block() {
        let backend = MemoryBackend::at_block(41);
        let call = RuntimeCall::remark(b"hello".to_vec());

        let address = schedule_inline_call_with_origin(&backend, &call, OriginCaller::Root)
            .await
            .unwrap();
        assert_eq!(address, (42, 0));

        let slot = AgendaStore::new(&backend).read_slot(42).await.unwrap();
        let task = slot[0].as_ref().unwrap();
        assert_eq!(task.call, CallDescriptor::inline(call.to_bytes()));
        assert_eq!(task.origin, OriginCaller::Root);
    }

    #[tokio::test]
    async fn test_lookup_injection_notes_preimage() {
        let backend = MemoryBackend::at_block(1);
        let call = RuntimeCall::set_storage(vec![(b"k".to_vec(), b"v".to_vec())]);
        let bytes = call.to_bytes();

        schedule_lookup_call_with_origin(&backend, &call, OriginCaller::Root)
            .await
            .unwrap();
        schedule_lookup_call_with_origin(&backend, &call, OriginCaller::Root)
            .await
            .unwrap();

        let hash = call.content_hash();
        assert_eq!(
            backend.get(&storage::preimage_key(&hash, bytes.len() as u32)),
            Some(bytes)
        );
        let slot = AgendaStore::new(&backend).read_slot(2).await.unwrap();
        assert_eq!(slot.len(), 2);
        assert!(slot.iter().flatten().all(|task| task.call.content_hash() == hash));
    }
}
