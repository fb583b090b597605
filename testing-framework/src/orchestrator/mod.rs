// File: testing-framework/src/orchestrator/mod.rs
//
// Orchestrator Module - Fast-Forward State Machine
//
// Drives one governance proposal from submission to enactment within a
// handful of blocks instead of the track's real decision timeline.

use log::{debug, info};

use gov_common::{
    call::RuntimeCall,
    crypto::Hash,
    event::RuntimeEvent,
    origin::OriginCaller,
    referenda::{ProposalState, ReferendumIndex, TrackId},
    scheduler::{CallDescriptor, TaskAddress},
    serializer::Serializer,
};

use crate::{
    backend::StorageBackend,
    config::FastForwardConfig,
    fast_forward::{
        schedule_inline_call_with_origin, synthesize_approval, AgendaStore, FastForwardError,
        ProposalStore, Result, TaskLocator, TaskRelocator,
    },
};

/// Lifecycle of one fast-forwarded proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Drafted,
    Submitted,
    DepositPlaced,
    StateSynthesized,
    NudgeRelocated,
    EnactmentRelocated,
    Advanced,
    Verified,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Drafted => "drafted",
            Stage::Submitted => "submitted",
            Stage::DepositPlaced => "deposit_placed",
            Stage::StateSynthesized => "state_synthesized",
            Stage::NudgeRelocated => "nudge_relocated",
            Stage::EnactmentRelocated => "enactment_relocated",
            Stage::Advanced => "advanced",
            Stage::Verified => "verified",
        }
    }
}

/// Fast-forward of one `(call, track, origin)` triple
///
/// Each transition is a separate method so a test can stop at any stage
/// and inspect the chain. Calling a transition from the wrong stage fails
/// with [`FastForwardError::OutOfOrder`] and leaves the machine untouched.
///
/// # Example
///
/// ```rust,ignore
/// use gov_testing_framework::prelude::*;
///
/// let chain = TestChainBuilder::new().build().await?;
/// let config = FastForwardConfig::default();
/// let call = RuntimeCall::remark(b"governance".to_vec());
///
/// let mut ff = FastForward::new(&chain, &config, call, 0, OriginCaller::Root);
/// ff.submit().await?;
/// ff.place_deposit().await?;
/// ff.synthesize().await?;
/// ff.relocate_nudge().await?;
/// ff.relocate_enactment().await?;
/// ff.advance().await?;
/// let id = ff.verify().await?;
/// ```
pub struct FastForward<'a, B: StorageBackend + ?Sized> {
    backend: &'a B,
    config: &'a FastForwardConfig,
    call: RuntimeCall,
    track: TrackId,
    origin: OriginCaller,
    stage: Stage,
    proposal: Option<ReferendumIndex>,
    /// Address of the referendum's own alarm, read before synthesis
    nudge: Option<TaskAddress>,
    /// Tasks scheduled by the chain in the nudge block
    scheduled: Vec<TaskAddress>,
    enactment: Option<TaskAddress>,
}

impl<'a, B: StorageBackend + ?Sized> FastForward<'a, B> {
    pub fn new(
        backend: &'a B,
        config: &'a FastForwardConfig,
        call: RuntimeCall,
        track: TrackId,
        origin: OriginCaller,
    ) -> Self {
        Self {
            backend,
            config,
            call,
            track,
            origin,
            stage: Stage::Drafted,
            proposal: None,
            nudge: None,
            scheduled: Vec::new(),
            enactment: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Index assigned by the chain, known once submitted
    pub fn proposal_id(&self) -> Option<ReferendumIndex> {
        self.proposal
    }

    /// Content hash of the proposed call
    pub fn proposal_hash(&self) -> Hash {
        self.call.content_hash()
    }

    fn ensure_stage(&self, expected: Stage) -> Result<()> {
        if self.stage != expected {
            return Err(FastForwardError::OutOfOrder {
                expected: expected.name(),
                actual: self.stage.name(),
            });
        }
        Ok(())
    }

    fn id(&self) -> Result<ReferendumIndex> {
        self.proposal
            .ok_or_else(|| FastForwardError::invariant("no referendum submitted"))
    }

    fn transition(&mut self, next: Stage) {
        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "fast-forward of {:?}: {} -> {}",
                self.proposal,
                self.stage.name(),
                next.name()
            );
        }
        self.stage = next;
    }

    /// Note the call's preimage and submit it by lookup. Returns the assigned id.
    pub async fn submit(&mut self) -> Result<ReferendumIndex> {
        self.ensure_stage(Stage::Drafted)?;
        let submitter = OriginCaller::Signed(self.config.submitter.clone());
        let bytes = self.call.to_bytes();

        schedule_inline_call_with_origin(
            self.backend,
            &RuntimeCall::note_preimage(bytes.clone()),
            submitter.clone(),
        )
        .await?;
        schedule_inline_call_with_origin(
            self.backend,
            &RuntimeCall::submit(
                self.origin.clone(),
                CallDescriptor::lookup(&bytes),
                self.config.enactment,
            ),
            submitter,
        )
        .await?;
        self.backend.produce_block(1).await?;

        let events = self.backend.query_events().await?;
        let (id, track) = events
            .iter()
            .find_map(|event| event.submitted_index())
            .ok_or_else(|| FastForwardError::MissingEvent("referendum submission".to_string()))?;

        if track != self.track {
            return Err(FastForwardError::TrackMismatch {
                index: id,
                expected: self.track,
                actual: track,
            });
        }

        let proposal = ProposalStore::new(self.backend).get(id).await?;
        if proposal.track() != Some(self.track) {
            return Err(FastForwardError::invariant(format!(
                "stored referendum {} is on track {:?}, event said {}",
                id,
                proposal.track(),
                track
            )));
        }

        if log::log_enabled!(log::Level::Info) {
            info!(
                "submitted call {} as referendum {} on track {}",
                self.proposal_hash(),
                id,
                track
            );
        }
        self.proposal = Some(id);
        self.transition(Stage::Submitted);
        Ok(id)
    }

    pub async fn place_deposit(&mut self) -> Result<()> {
        self.ensure_stage(Stage::Submitted)?;
        let id = self.id()?;
        schedule_inline_call_with_origin(
            self.backend,
            &RuntimeCall::place_decision_deposit(id),
            OriginCaller::Signed(self.config.submitter.clone()),
        )
        .await?;
        self.backend.produce_block(1).await?;

        self.transition(Stage::DepositPlaced);
        Ok(())
    }

    /// Overwrite the referendum with an approvable tally and elapsed windows
    pub async fn synthesize(&mut self) -> Result<()> {
        self.ensure_stage(Stage::DepositPlaced)?;
        let id = self.id()?;
        let proposals = ProposalStore::new(self.backend);
        let proposal = proposals.get(id).await?;

        let mut status = match proposal.state {
            ProposalState::Ongoing(status) => status,
            state => {
                return Err(FastForwardError::invariant(format!(
                    "referendum {} is {}, expected ongoing",
                    id,
                    state.name()
                )))
            }
        };
        if status.decision_deposit.is_none() {
            return Err(FastForwardError::invariant(format!(
                "referendum {} has no decision deposit",
                id
            )));
        }

        let alarm = status.alarm.map(|(_, address)| address);
        let current = AgendaStore::new(self.backend).current_block().await?;
        let total_issuance = proposals.total_issuance().await?;
        let approval = synthesize_approval(current, total_issuance);

        status.tally = approval.tally;
        status.deciding = Some(approval.deciding);
        status.confirming = Some(approval.confirming);
        status.alarm = Some(approval.alarm);
        proposals.patch(id, ProposalState::Ongoing(status)).await?;
        self.nudge = alarm;

        self.transition(Stage::StateSynthesized);
        Ok(())
    }

    /// Move the referendum's pending nudge to the next block and produce it
    pub async fn relocate_nudge(&mut self) -> Result<()> {
        self.ensure_stage(Stage::StateSynthesized)?;
        let id = self.id()?;
        let nudge = RuntimeCall::nudge_referendum(id).content_hash();
        let alarm = self
            .nudge
            .ok_or_else(|| FastForwardError::NoScheduledCallFound(nudge.clone()))?;
        self.relocate_next(&nudge, &[alarm]).await?;
        self.backend.produce_block(1).await?;

        let events = self.backend.query_events().await?;
        self.scheduled = events
            .iter()
            .filter_map(RuntimeEvent::scheduled_address)
            .collect();
        if self.config.verify_events && !events.iter().any(|event| event.is_approved(id)) {
            return Err(FastForwardError::MissingEvent(format!(
                "approval of referendum {}",
                id
            )));
        }

        self.transition(Stage::NudgeRelocated);
        Ok(())
    }

    /// Move the enactment of the approved proposal to the next block
    pub async fn relocate_enactment(&mut self) -> Result<()> {
        self.ensure_stage(Stage::NudgeRelocated)?;
        // Only the task the approval scheduled, not an older copy of the call
        let address = self
            .relocate_next(&self.proposal_hash(), &self.scheduled)
            .await?;
        self.enactment = Some(address);

        self.transition(Stage::EnactmentRelocated);
        Ok(())
    }

    pub async fn advance(&mut self) -> Result<()> {
        self.ensure_stage(Stage::EnactmentRelocated)?;
        self.backend.produce_block(1).await?;

        self.transition(Stage::Advanced);
        Ok(())
    }

    /// Check the referendum ended approved and its enactment ran
    pub async fn verify(&mut self) -> Result<ReferendumIndex> {
        self.ensure_stage(Stage::Advanced)?;
        let id = self.id()?;
        let proposal = ProposalStore::new(self.backend).get(id).await?;
        if !proposal.state.is_approved() {
            return Err(FastForwardError::TerminalStateMismatch {
                index: id,
                state: Box::new(proposal.state),
            });
        }

        if self.config.verify_events {
            let address = self
                .enactment
                .ok_or_else(|| FastForwardError::invariant("enactment was never relocated"))?;
            let events = self.backend.query_events().await?;
            let result = events
                .iter()
                .filter_map(|event| event.dispatch_result())
                .find(|(task, _, _)| **task == address)
                .map(|(_, _, result)| result.clone());

            match result {
                Some(Ok(())) => {}
                Some(Err(e)) => {
                    return Err(FastForwardError::MissingEvent(format!(
                        "successful enactment of referendum {}, dispatch failed: {}",
                        id, e
                    )))
                }
                None => {
                    return Err(FastForwardError::MissingEvent(format!(
                        "dispatch of enactment task {:?}",
                        address
                    )))
                }
            }
        }

        if log::log_enabled!(log::Level::Info) {
            info!("referendum {} fast-forwarded and enacted", id);
        }
        self.transition(Stage::Verified);
        Ok(id)
    }

    /// Run every remaining transition
    pub async fn run(mut self) -> Result<ReferendumIndex> {
        if self.stage == Stage::Drafted {
            self.submit().await?;
        }
        if self.stage == Stage::Submitted {
            self.place_deposit().await?;
        }
        if self.stage == Stage::DepositPlaced {
            self.synthesize().await?;
        }
        if self.stage == Stage::StateSynthesized {
            self.relocate_nudge().await?;
        }
        if self.stage == Stage::NudgeRelocated {
            self.relocate_enactment().await?;
        }
        if self.stage == Stage::EnactmentRelocated {
            self.advance().await?;
        }
        self.verify().await
    }

    async fn relocate_next(&self, hash: &Hash, candidates: &[TaskAddress]) -> Result<TaskAddress> {
        let task = TaskLocator::new(self.backend)
            .find_scheduled(hash, candidates)
            .await?;
        let next = AgendaStore::new(self.backend)
            .current_block()
            .await?
            .saturating_add(1);
        let relocated = TaskRelocator::new(self.backend)
            .relocate(task.address(), next)
            .await?;
        Ok(relocated.address())
    }
}

/// Fast-forward `call` through governance on `track`, dispatched with `origin`.
/// Returns the referendum index.
pub async fn fast_forward<B: StorageBackend + ?Sized>(
    backend: &B,
    config: &FastForwardConfig,
    call: RuntimeCall,
    track: TrackId,
    origin: OriginCaller,
) -> Result<ReferendumIndex> {
    FastForward::new(backend, config, call, track, origin)
        .run()
        .await
}
