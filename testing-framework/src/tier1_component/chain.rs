// In-process simulated chain.
//
// Storage is a sorted key/value map. Producing a block bumps
// `System::Number` and services the scheduler agenda of the new block,
// dispatching every due call to the pallet that owns it.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, trace};
use parking_lot::RwLock;

use gov_common::{
    block::BlockNumber,
    call::RuntimeCall,
    event::RuntimeEvent,
    origin::OriginCaller,
    referenda::{ProposalState, ReferendumIndex, Tracks},
    serializer::Serializer,
    storage,
};

use super::{
    ext::{DispatchResult, Ext},
    pallets::{preimage, referenda, scheduler, system},
};
use crate::backend::{StorageBackend, StorageKey, StorageValue};

#[derive(Debug, Default)]
struct ChainState {
    storage: BTreeMap<StorageKey, StorageValue>,
    /// Events of the last produced block
    events: Vec<RuntimeEvent>,
    history: Vec<(BlockNumber, Vec<RuntimeEvent>)>,
}

/// Simulated governance chain implementing [`StorageBackend`]
#[derive(Debug)]
pub struct TestChain {
    state: RwLock<ChainState>,
    tracks: Tracks,
}

impl TestChain {
    pub(crate) fn new(tracks: Tracks, storage: BTreeMap<StorageKey, StorageValue>) -> Self {
        Self {
            state: RwLock::new(ChainState {
                storage,
                ..Default::default()
            }),
            tracks,
        }
    }

    pub fn tracks(&self) -> &Tracks {
        &self.tracks
    }

    pub fn block_number(&self) -> Result<BlockNumber> {
        Ok(self.get(&storage::block_number_key())?.unwrap_or(0))
    }

    pub fn total_issuance(&self) -> Result<u128> {
        Ok(self.get(&storage::total_issuance_key())?.unwrap_or(0))
    }

    pub fn referendum(&self, index: ReferendumIndex) -> Result<Option<ProposalState>> {
        self.get(&storage::referendum_info_key(index))
    }

    /// Raw storage value
    pub fn storage_value(&self, key: &[u8]) -> Option<StorageValue> {
        self.state.read().storage.get(key).cloned()
    }

    /// Events of the last produced block
    pub fn events(&self) -> Vec<RuntimeEvent> {
        self.state.read().events.clone()
    }

    /// Events of every produced block, oldest first
    pub fn event_history(&self) -> Vec<(BlockNumber, Vec<RuntimeEvent>)> {
        self.state.read().history.clone()
    }

    fn get<T: Serializer>(&self, key: &[u8]) -> Result<Option<T>> {
        let state = self.state.read();
        state
            .storage
            .get(key)
            .map(|bytes| T::from_bytes(bytes))
            .transpose()
            .context("decoding chain storage value")
    }

    fn execute_block(&self) -> Result<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        let parent: BlockNumber = match state.storage.get(&storage::block_number_key()) {
            Some(bytes) => BlockNumber::from_bytes(bytes)?,
            None => 0,
        };
        let now = parent.saturating_add(1);
        state
            .storage
            .insert(storage::block_number_key(), now.to_bytes());

        let mut events = Vec::new();
        let executed = {
            let mut ext = Ext::new(&mut state.storage, &mut events, &self.tracks, now);
            scheduler::service_agenda(&mut ext, dispatch)
                .with_context(|| format!("servicing agenda of block {}", now))?
        };

        if log::log_enabled!(log::Level::Debug) && executed > 0 {
            debug!(
                "block {}: {} tasks executed, {} events",
                now,
                executed,
                events.len()
            );
        }
        state.history.push((now, events.clone()));
        state.events = events;
        Ok(())
    }
}

/// Route a decoded call to the pallet that owns it
pub(crate) fn dispatch(ext: &mut Ext, origin: &OriginCaller, call: RuntimeCall) -> DispatchResult {
    match call {
        RuntimeCall::System(call) => system::dispatch(ext, origin, call),
        RuntimeCall::Scheduler(call) => scheduler::dispatch(ext, origin, call),
        RuntimeCall::Preimage(call) => preimage::dispatch(ext, origin, call),
        RuntimeCall::Referenda(call) => referenda::dispatch(ext, origin, call),
    }
}

#[async_trait]
impl StorageBackend for TestChain {
    async fn read_storage(&self, key: &[u8]) -> Result<Option<StorageValue>> {
        Ok(self.storage_value(key))
    }

    async fn read_prefix(&self, prefix: &[u8]) -> Result<Vec<(StorageKey, StorageValue)>> {
        let state = self.state.read();
        Ok(state
            .storage
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    async fn write_storage(&self, entries: Vec<(StorageKey, StorageValue)>) -> Result<()> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("external write of {} storage entries", entries.len());
        }
        let mut state = self.state.write();
        state.storage.extend(entries);
        Ok(())
    }

    async fn produce_block(&self, count: u32) -> Result<()> {
        for _ in 0..count {
            self.execute_block()?;
        }
        Ok(())
    }

    async fn query_events(&self) -> Result<Vec<RuntimeEvent>> {
        Ok(self.events())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fast_forward::{schedule_inline_call_with_origin, schedule_lookup_call_with_origin},
        tier1_component::{
            pallets::{alarm_name, enactment_name, referenda::UNDECIDING_TIMEOUT},
            TestChainBuilder,
        },
    };
    use gov_common::{
        crypto::Hash,
        error::DispatchError,
        event::{ReferendaEvent, SchedulerEvent, SystemEvent},
        event::PreimageEvent,
        referenda::{Curve, Perbill, TrackInfo},
        scheduler::{AgendaSlot, CallDescriptor, DispatchTime, Scheduled, MAX_SCHEDULED_PER_BLOCK},
    };

    fn alice() -> OriginCaller {
        OriginCaller::Signed(Hash::new([0xA1; 32]))
    }

    fn fast_track() -> Tracks {
        Tracks::new(vec![TrackInfo {
            id: 0,
            name: "root".to_string(),
            origin: OriginCaller::Root,
            decision_deposit: 10,
            prepare_period: 2,
            decision_period: 5,
            confirm_period: 1,
            min_enactment_period: 1,
            min_approval: Curve::LinearDecreasing {
                length: Perbill::one(),
                floor: Perbill::from_percent(50),
                ceil: Perbill::from_percent(100),
            },
            min_support: Curve::LinearDecreasing {
                length: Perbill::one(),
                floor: Perbill::zero(),
                ceil: Perbill::from_percent(50),
            },
        }])
    }

    async fn submit(chain: &TestChain, proposal: &RuntimeCall) -> ReferendumIndex {
        schedule_inline_call_with_origin(
            chain,
            &RuntimeCall::submit(
                OriginCaller::Root,
                CallDescriptor::lookup(&proposal.to_bytes()),
                DispatchTime::After(1),
            ),
            alice(),
        )
        .await
        .unwrap();
        chain.produce_block(1).await.unwrap();

        chain
            .events()
            .iter()
            .find_map(RuntimeEvent::submitted_index)
            .map(|(index, _)| index)
            .unwrap()
    }

    #[tokio::test]
    async fn test_injected_remark_is_dispatched() {
        let chain = TestChainBuilder::new().build().await.unwrap();
        let call = RuntimeCall::remark(b"hello".to_vec());
        schedule_lookup_call_with_origin(&chain, &call, alice())
            .await
            .unwrap();

        chain.produce_block(1).await.unwrap();
        assert_eq!(chain.block_number().unwrap(), 2);
        let events = chain.events();
        assert!(events.contains(&RuntimeEvent::System(SystemEvent::Remarked {
            hash: gov_common::crypto::hash(b"hello"),
        })));
        assert!(events.iter().any(|event| matches!(
            event.dispatch_result(),
            Some((&(2, 0), None, Ok(())))
        )));
        // the slot is gone once serviced
        assert!(chain.storage_value(&storage::agenda_key(2)).is_none());
    }

    #[tokio::test]
    async fn test_set_storage_requires_root() {
        let chain = TestChainBuilder::new().build().await.unwrap();
        let call = RuntimeCall::set_storage(vec![(b"key".to_vec(), b"value".to_vec())]);
        schedule_inline_call_with_origin(&chain, &call, alice())
            .await
            .unwrap();
        chain.produce_block(1).await.unwrap();
        assert!(chain.storage_value(b"key").is_none());
        assert!(chain.events().iter().any(|event| matches!(
            event.dispatch_result(),
            Some((_, _, Err(DispatchError::BadOrigin)))
        )));

        schedule_inline_call_with_origin(&chain, &call, OriginCaller::Root)
            .await
            .unwrap();
        chain.produce_block(1).await.unwrap();
        assert_eq!(chain.storage_value(b"key"), Some(b"value".to_vec()));
    }

    #[tokio::test]
    async fn test_undecodable_and_unavailable_calls() {
        let chain = TestChainBuilder::new().build().await.unwrap();
        let agenda = crate::fast_forward::AgendaStore::new(&chain);
        agenda
            .append(
                2,
                gov_common::scheduler::Scheduled::new(
                    CallDescriptor::inline(vec![0xEE, 0xEE]),
                    OriginCaller::Root,
                ),
            )
            .await
            .unwrap();
        agenda
            .append(
                2,
                gov_common::scheduler::Scheduled::new(
                    CallDescriptor::lookup(b"never noted"),
                    OriginCaller::Root,
                ),
            )
            .await
            .unwrap();

        chain.produce_block(1).await.unwrap();
        let events = chain.events();
        assert!(events.iter().any(|event| matches!(
            event.dispatch_result(),
            Some((&(2, 0), _, Err(DispatchError::Undecodable)))
        )));
        assert!(events.contains(&RuntimeEvent::Scheduler(
            SchedulerEvent::CallUnavailable {
                task: (2, 1),
                id: None
            }
        )));
    }

    #[tokio::test]
    async fn test_submission_arms_alarm() {
        let chain = TestChainBuilder::new().build().await.unwrap();
        let index = submit(&chain, &RuntimeCall::remark(vec![1])).await;
        assert_eq!(index, 0);

        let status = chain.referendum(0).unwrap().unwrap();
        let status = status.as_ongoing().unwrap();
        let (when, address) = status.alarm.unwrap();
        assert_eq!(when, 2 + UNDECIDING_TIMEOUT);

        let lookup = chain
            .storage_value(&storage::lookup_key(&alarm_name(0)))
            .unwrap();
        assert_eq!(gov_common::scheduler::TaskAddress::from_bytes(&lookup).unwrap(), address);

        // second submission gets the next index
        assert_eq!(submit(&chain, &RuntimeCall::remark(vec![2])).await, 1);
    }

    #[tokio::test]
    async fn test_submission_needs_signed_origin_and_track() {
        let chain = TestChainBuilder::new().build().await.unwrap();
        let call = RuntimeCall::submit(
            OriginCaller::Origins(99),
            CallDescriptor::lookup(b"x"),
            DispatchTime::After(1),
        );
        schedule_inline_call_with_origin(&chain, &call, alice())
            .await
            .unwrap();
        schedule_inline_call_with_origin(&chain, &call, OriginCaller::Root)
            .await
            .unwrap();
        chain.produce_block(1).await.unwrap();

        let results: Vec<_> = chain
            .events()
            .iter()
            .filter_map(|event| event.dispatch_result().map(|(_, _, result)| result.clone()))
            .collect();
        assert_eq!(
            results,
            vec![Err(DispatchError::NoTrack), Err(DispatchError::BadOrigin)]
        );
        assert!(chain.referendum(0).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unpassing_referendum_is_rejected() {
        let chain = TestChainBuilder::new()
            .with_tracks(fast_track())
            .build()
            .await
            .unwrap();
        let index = submit(&chain, &RuntimeCall::remark(vec![1])).await;

        schedule_inline_call_with_origin(&chain, &RuntimeCall::place_decision_deposit(index), alice())
            .await
            .unwrap();
        chain.produce_block(1).await.unwrap();
        // block 3: prepare period ends at block 4
        let status = chain.referendum(index).unwrap().unwrap();
        assert_eq!(status.as_ongoing().unwrap().alarm.unwrap().0, 4);

        chain.produce_block(1).await.unwrap();
        assert!(chain.events().iter().any(|event| matches!(
            event,
            RuntimeEvent::Referenda(ReferendaEvent::DecisionStarted { index: 0, .. })
        )));

        chain.produce_block(5).await.unwrap();
        assert!(matches!(
            chain.referendum(index).unwrap(),
            Some(ProposalState::Rejected(_))
        ));
        assert!(chain
            .storage_value(&storage::lookup_key(&alarm_name(index)))
            .is_none());
        assert!(chain
            .storage_value(&storage::lookup_key(&enactment_name(index)))
            .is_none());
    }

    #[tokio::test]
    async fn test_second_decision_deposit_fails() {
        let chain = TestChainBuilder::new().build().await.unwrap();
        let index = submit(&chain, &RuntimeCall::remark(vec![1])).await;
        for _ in 0..2 {
            schedule_inline_call_with_origin(
                &chain,
                &RuntimeCall::place_decision_deposit(index),
                alice(),
            )
            .await
            .unwrap();
        }
        chain.produce_block(1).await.unwrap();

        let results: Vec<_> = chain
            .events()
            .iter()
            .filter_map(|event| event.dispatch_result().map(|(_, _, result)| result.clone()))
            .collect();
        assert_eq!(results, vec![Ok(()), Err(DispatchError::HasDeposit)]);
    }

    #[tokio::test]
    async fn test_referendum_without_deposit_times_out() {
        let chain = TestChainBuilder::new().build().await.unwrap();
        let index = submit(&chain, &RuntimeCall::remark(vec![1])).await;

        chain.produce_block(UNDECIDING_TIMEOUT).await.unwrap();
        assert!(matches!(
            chain.referendum(index).unwrap(),
            Some(ProposalState::TimedOut(_))
        ));
        assert!(chain.events().iter().any(|event| matches!(
            event,
            RuntimeEvent::Referenda(ReferendaEvent::TimedOut { index: 0, .. })
        )));
    }

    #[tokio::test]
    async fn test_kill_cancels_alarm() {
        let chain = TestChainBuilder::new().build().await.unwrap();
        let index = submit(&chain, &RuntimeCall::remark(vec![1])).await;
        let (when, _) = chain
            .referendum(index)
            .unwrap()
            .unwrap()
            .as_ongoing()
            .unwrap()
            .alarm
            .unwrap();

        schedule_inline_call_with_origin(
            &chain,
            &RuntimeCall::Referenda(gov_common::call::ReferendaCall::Kill { index }),
            OriginCaller::Root,
        )
        .await
        .unwrap();
        chain.produce_block(1).await.unwrap();

        assert_eq!(chain.referendum(index).unwrap(), Some(ProposalState::Killed(3)));
        assert!(chain.storage_value(&storage::agenda_key(when)).is_none());
        assert!(chain.events().contains(&RuntimeEvent::Scheduler(
            SchedulerEvent::Canceled { when, index: 0 }
        )));
    }

    fn full_slot(holes: usize, filled: usize) -> AgendaSlot {
        let task = Scheduled::new(
            CallDescriptor::inline(RuntimeCall::remark(vec![0]).to_bytes()),
            OriginCaller::Root,
        );
        let mut slot = vec![None; holes];
        slot.extend(vec![Some(task); filled]);
        slot
    }

    #[tokio::test]
    async fn test_failed_submission_leaves_no_trace() {
        // the alarm slot of a submission made at block 2 is already full
        let alarm_slot = 2 + UNDECIDING_TIMEOUT;
        let chain = TestChainBuilder::new()
            .with_storage(
                storage::agenda_key(alarm_slot),
                full_slot(0, MAX_SCHEDULED_PER_BLOCK).to_bytes(),
            )
            .build()
            .await
            .unwrap();
        let call = RuntimeCall::submit(
            OriginCaller::Root,
            CallDescriptor::lookup(&RuntimeCall::remark(vec![1]).to_bytes()),
            DispatchTime::After(1),
        );
        schedule_inline_call_with_origin(&chain, &call, alice())
            .await
            .unwrap();
        chain.produce_block(1).await.unwrap();

        let events = chain.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].dispatch_result(),
            Some((&(2, 0), None, Err(DispatchError::AgendaFull(slot)))) if *slot == alarm_slot
        ));
        assert!(chain
            .storage_value(&storage::referendum_count_key())
            .is_none());
        assert!(chain.referendum(0).unwrap().is_none());
        assert!(chain
            .storage_value(&storage::lookup_key(&alarm_name(0)))
            .is_none());
    }

    #[tokio::test]
    async fn test_capacity_counts_filled_entries_only() {
        let alarm_slot = 2 + UNDECIDING_TIMEOUT;
        let chain = TestChainBuilder::new()
            .with_storage(
                storage::agenda_key(alarm_slot),
                full_slot(2, MAX_SCHEDULED_PER_BLOCK - 1).to_bytes(),
            )
            .build()
            .await
            .unwrap();
        let index = submit(&chain, &RuntimeCall::remark(vec![1])).await;
        let status = chain.referendum(index).unwrap().unwrap();
        assert_eq!(status.as_ongoing().unwrap().alarm.unwrap(), (alarm_slot, (alarm_slot, 0)));

        // a hole is left but the slot is at capacity
        let chain = TestChainBuilder::new()
            .with_storage(
                storage::agenda_key(alarm_slot),
                full_slot(1, MAX_SCHEDULED_PER_BLOCK).to_bytes(),
            )
            .build()
            .await
            .unwrap();
        let call = RuntimeCall::submit(
            OriginCaller::Root,
            CallDescriptor::lookup(&RuntimeCall::remark(vec![1]).to_bytes()),
            DispatchTime::After(1),
        );
        schedule_inline_call_with_origin(&chain, &call, alice())
            .await
            .unwrap();
        chain.produce_block(1).await.unwrap();
        assert!(chain.events().iter().any(|event| matches!(
            event.dispatch_result(),
            Some((_, _, Err(DispatchError::AgendaFull(_))))
        )));
    }

    #[tokio::test]
    async fn test_legacy_reference_dispatch() {
        let chain = TestChainBuilder::new().build().await.unwrap();
        let remark = RuntimeCall::remark(b"legacy".to_vec());
        let bytes = remark.to_bytes();
        schedule_inline_call_with_origin(&chain, &RuntimeCall::note_preimage(bytes.clone()), alice())
            .await
            .unwrap();
        chain.produce_block(1).await.unwrap();

        let agenda = crate::fast_forward::AgendaStore::new(&chain);
        let legacy = CallDescriptor::Legacy {
            hash: gov_common::crypto::hash(&bytes),
        };
        agenda
            .append(3, Scheduled::new(legacy, OriginCaller::Root))
            .await
            .unwrap();
        agenda
            .append(
                3,
                Scheduled::new(
                    CallDescriptor::Legacy {
                        hash: gov_common::crypto::hash(b"never noted"),
                    },
                    OriginCaller::Root,
                ),
            )
            .await
            .unwrap();
        chain.produce_block(1).await.unwrap();

        let events = chain.events();
        assert!(events.contains(&RuntimeEvent::System(SystemEvent::Remarked {
            hash: gov_common::crypto::hash(b"legacy"),
        })));
        assert!(events.iter().any(|event| matches!(
            event.dispatch_result(),
            Some((&(3, 0), None, Ok(())))
        )));
        assert!(events.contains(&RuntimeEvent::Scheduler(
            SchedulerEvent::CallUnavailable {
                task: (3, 1),
                id: None
            }
        )));
    }

    #[tokio::test]
    async fn test_unnote_preimage_requires_root() {
        let chain = TestChainBuilder::new().build().await.unwrap();
        let bytes = b"noted".to_vec();
        let hash = gov_common::crypto::hash(&bytes);
        schedule_inline_call_with_origin(&chain, &RuntimeCall::note_preimage(bytes.clone()), alice())
            .await
            .unwrap();
        chain.produce_block(1).await.unwrap();
        let key = storage::preimage_key(&hash, bytes.len() as u32);
        assert_eq!(chain.storage_value(&key), Some(bytes.clone()));

        let unnote = RuntimeCall::Preimage(gov_common::call::PreimageCall::UnnotePreimage {
            hash: hash.clone(),
        });
        schedule_inline_call_with_origin(&chain, &unnote, alice())
            .await
            .unwrap();
        chain.produce_block(1).await.unwrap();
        assert!(chain.events().iter().any(|event| matches!(
            event.dispatch_result(),
            Some((_, _, Err(DispatchError::BadOrigin)))
        )));
        assert!(chain.storage_value(&key).is_some());

        schedule_inline_call_with_origin(&chain, &unnote, OriginCaller::Root)
            .await
            .unwrap();
        chain.produce_block(1).await.unwrap();
        assert!(chain.events().contains(&RuntimeEvent::Preimage(PreimageEvent::Cleared {
            hash: hash.clone(),
        })));
        assert!(chain.storage_value(&key).is_none());
        assert!(chain
            .storage_value(&storage::request_status_key(&hash))
            .is_none());

        // nothing left to clear
        schedule_inline_call_with_origin(&chain, &unnote, OriginCaller::Root)
            .await
            .unwrap();
        chain.produce_block(1).await.unwrap();
        assert!(chain.events().iter().any(|event| matches!(
            event.dispatch_result(),
            Some((_, _, Err(DispatchError::Unavailable(missing)))) if missing == &hash
        )));
    }

    #[tokio::test]
    async fn test_periodic_task_repeats() {
        let chain = TestChainBuilder::new().build().await.unwrap();
        let agenda = crate::fast_forward::AgendaStore::new(&chain);
        let name = [7; 32];
        let mut task = Scheduled::named(
            name,
            CallDescriptor::inline(RuntimeCall::remark(b"tick".to_vec()).to_bytes()),
            OriginCaller::Root,
        );
        task.maybe_periodic = Some((10, 3));
        agenda.append(2, task).await.unwrap();

        chain.produce_block(1).await.unwrap();
        assert_eq!(agenda.read_lookup(&name).await.unwrap(), Some((12, 0)));
        let next = agenda.read_slot(12).await.unwrap();
        assert_eq!(next[0].as_ref().unwrap().maybe_periodic, Some((10, 2)));

        chain.produce_block(10).await.unwrap();
        assert_eq!(agenda.read_lookup(&name).await.unwrap(), Some((22, 0)));

        chain.produce_block(20).await.unwrap();
        assert_eq!(agenda.read_lookup(&name).await.unwrap(), None);
        assert!(agenda.entries().await.unwrap().is_empty());

        let runs: Vec<_> = chain
            .event_history()
            .iter()
            .flat_map(|(_, events)| events.iter())
            .filter_map(|event| event.dispatch_result().map(|(task, _, _)| *task))
            .collect();
        assert_eq!(runs, vec![(2, 0), (12, 0), (22, 0)]);
    }
}
