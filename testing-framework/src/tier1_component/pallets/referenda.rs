// Referenda pallet: submission, decision deposit and the nudge state machine.
//
// Every ongoing referendum owns one named alarm task that re-evaluates it.
// Once confirmation completes the proposal is scheduled as a named
// enactment task with the proposal origin.

use log::{debug, info};

use gov_common::{
    block::BlockNumber,
    call::{ReferendaCall, RuntimeCall},
    error::DispatchError,
    event::{ReferendaEvent, RuntimeEvent},
    origin::OriginCaller,
    referenda::{
        Concluded, ConfirmingWindow, DecidingWindow, Deposit, OngoingStatus, ProposalState,
        ReferendumIndex, Tally, TrackInfo,
    },
    scheduler::{CallDescriptor, DispatchTime, Scheduled, TaskName, HARD_DEADLINE},
    serializer::Serializer,
    storage,
};

use super::scheduler::{self, ensure_root, task_name};
use crate::tier1_component::ext::{DispatchResult, Ext};

pub const SUBMISSION_DEPOSIT: u128 = 1_000;

/// Blocks a referendum may wait for its decision deposit
pub const UNDECIDING_TIMEOUT: BlockNumber = 201_600;

pub const ALARM_PRIORITY: u8 = 128;

pub fn alarm_name(index: ReferendumIndex) -> TaskName {
    task_name(b"referenda:alarm", index)
}

pub fn enactment_name(index: ReferendumIndex) -> TaskName {
    task_name(b"referenda:enactment", index)
}

enum Outcome {
    Approved,
    Rejected,
    TimedOut,
    Cancelled,
}

pub(crate) fn dispatch(ext: &mut Ext, origin: &OriginCaller, call: ReferendaCall) -> DispatchResult {
    match call {
        ReferendaCall::Submit {
            proposal_origin,
            proposal,
            enactment_moment,
        } => submit(ext, origin, proposal_origin, proposal, enactment_moment),
        ReferendaCall::PlaceDecisionDeposit { index } => {
            place_decision_deposit(ext, origin, index)
        }
        ReferendaCall::NudgeReferendum { index } => {
            ensure_root(origin)?;
            let status = read_ongoing(ext, index)?;
            let state = service(ext, index, status)?;
            store(ext, index, &state);
            Ok(())
        }
        ReferendaCall::Cancel { index } => {
            ensure_root(origin)?;
            let status = read_ongoing(ext, index)?;
            let state = conclude(ext, index, status, Outcome::Cancelled);
            store(ext, index, &state);
            Ok(())
        }
        ReferendaCall::Kill { index } => {
            ensure_root(origin)?;
            let status = read_ongoing(ext, index)?;
            let now = ext.now;
            cancel_alarm(ext, index);
            store(ext, index, &ProposalState::Killed(now));
            ext.deposit_event(RuntimeEvent::Referenda(ReferendaEvent::Killed {
                index,
                tally: status.tally,
            }));
            Ok(())
        }
    }
}

fn submit(
    ext: &mut Ext,
    origin: &OriginCaller,
    proposal_origin: OriginCaller,
    proposal: CallDescriptor,
    enactment: DispatchTime,
) -> DispatchResult {
    let who = origin.as_signed().cloned().ok_or(DispatchError::BadOrigin)?;
    let tracks = ext.tracks;
    let track = tracks
        .track_for(&proposal_origin)
        .ok_or(DispatchError::NoTrack)?;

    let index: ReferendumIndex = ext.get(&storage::referendum_count_key())?.unwrap_or(0);
    ext.put(storage::referendum_count_key(), &index.saturating_add(1));

    let now = ext.now;
    let mut status = OngoingStatus {
        track: track.id,
        origin: proposal_origin,
        proposal: proposal.clone(),
        enactment,
        submitted: now,
        submission_deposit: Deposit {
            who,
            amount: SUBMISSION_DEPOSIT,
        },
        decision_deposit: None,
        deciding: None,
        confirming: None,
        tally: Tally::default(),
        alarm: None,
    };
    set_alarm(ext, index, &mut status, now.saturating_add(UNDECIDING_TIMEOUT))?;
    store(ext, index, &ProposalState::Ongoing(status));

    if log::log_enabled!(log::Level::Info) {
        info!("referendum {} submitted on track {}", index, track.name);
    }
    ext.deposit_event(RuntimeEvent::Referenda(ReferendaEvent::Submitted {
        index,
        track: track.id,
        proposal,
    }));
    Ok(())
}

fn place_decision_deposit(
    ext: &mut Ext,
    origin: &OriginCaller,
    index: ReferendumIndex,
) -> DispatchResult {
    let who = origin.as_signed().cloned().ok_or(DispatchError::BadOrigin)?;
    let mut status = read_ongoing(ext, index)?;
    if status.decision_deposit.is_some() {
        return Err(DispatchError::HasDeposit);
    }

    let amount = track_of(ext, &status)?.decision_deposit;
    status.decision_deposit = Some(Deposit {
        who: who.clone(),
        amount,
    });
    ext.deposit_event(RuntimeEvent::Referenda(ReferendaEvent::DecisionDepositPlaced {
        index,
        who,
        amount,
    }));

    let state = service(ext, index, status)?;
    store(ext, index, &state);
    Ok(())
}

// Advance an ongoing referendum as far as the current block allows and
// arm its alarm for the next point of interest.
fn service(
    ext: &mut Ext,
    index: ReferendumIndex,
    mut status: OngoingStatus,
) -> Result<ProposalState, DispatchError> {
    let now = ext.now;
    let track = track_of(ext, &status)?;

    if status.deciding.is_none() {
        if status.decision_deposit.is_none() {
            let timeout = status.submitted.saturating_add(UNDECIDING_TIMEOUT);
            if now >= timeout {
                return Ok(conclude(ext, index, status, Outcome::TimedOut));
            }
            set_alarm(ext, index, &mut status, timeout)?;
            return Ok(ProposalState::Ongoing(status));
        }

        let prepared = status.submitted.saturating_add(track.prepare_period);
        if now < prepared {
            set_alarm(ext, index, &mut status, prepared)?;
            return Ok(ProposalState::Ongoing(status));
        }

        status.deciding = Some(DecidingWindow { since: now });
        ext.deposit_event(RuntimeEvent::Referenda(ReferendaEvent::DecisionStarted {
            index,
            track: track.id,
            proposal: status.proposal.clone(),
            tally: status.tally.clone(),
        }));
    }

    let since = status.deciding.map_or(now, |deciding| deciding.since);
    let elapsed = now.saturating_sub(since);
    let total_issuance: u128 = ext.get(&storage::total_issuance_key())?.unwrap_or(0);

    if track.is_passing(&status.tally, elapsed, total_issuance) {
        let until = match status.confirming {
            Some(confirming) => confirming.until,
            None => {
                let until = now.saturating_add(track.confirm_period);
                status.confirming = Some(ConfirmingWindow { until });
                ext.deposit_event(RuntimeEvent::Referenda(ReferendaEvent::ConfirmStarted {
                    index,
                }));
                until
            }
        };

        if now >= until {
            ext.deposit_event(RuntimeEvent::Referenda(ReferendaEvent::Confirmed {
                index,
                tally: status.tally.clone(),
            }));
            schedule_enactment(ext, index, &status, track)?;
            return Ok(conclude(ext, index, status, Outcome::Approved));
        }
        set_alarm(ext, index, &mut status, until)?;
    } else {
        if status.confirming.take().is_some() {
            ext.deposit_event(RuntimeEvent::Referenda(ReferendaEvent::ConfirmAborted {
                index,
            }));
        }

        let deadline = since.saturating_add(track.decision_period);
        if now >= deadline {
            return Ok(conclude(ext, index, status, Outcome::Rejected));
        }
        set_alarm(ext, index, &mut status, deadline)?;
    }

    Ok(ProposalState::Ongoing(status))
}

fn schedule_enactment(
    ext: &mut Ext,
    index: ReferendumIndex,
    status: &OngoingStatus,
    track: &TrackInfo,
) -> DispatchResult {
    let now = ext.now;
    let when = status
        .enactment
        .evaluate(now)
        .max(now.saturating_add(track.min_enactment_period));
    let task = Scheduled::named(
        enactment_name(index),
        status.proposal.clone(),
        status.origin.clone(),
    )
    .with_priority(HARD_DEADLINE);

    let address = scheduler::schedule(ext, when, task)?;
    if log::log_enabled!(log::Level::Debug) {
        debug!("enactment of referendum {} scheduled at {:?}", index, address);
    }
    Ok(())
}

fn conclude(
    ext: &mut Ext,
    index: ReferendumIndex,
    status: OngoingStatus,
    outcome: Outcome,
) -> ProposalState {
    cancel_alarm(ext, index);

    let concluded = Concluded {
        at: ext.now,
        submission_deposit: Some(status.submission_deposit),
        decision_deposit: status.decision_deposit,
    };
    let tally = status.tally;
    let (state, event) = match outcome {
        Outcome::Approved => (
            ProposalState::Approved(concluded),
            ReferendaEvent::Approved { index },
        ),
        Outcome::Rejected => (
            ProposalState::Rejected(concluded),
            ReferendaEvent::Rejected { index, tally },
        ),
        Outcome::TimedOut => (
            ProposalState::TimedOut(concluded),
            ReferendaEvent::TimedOut { index, tally },
        ),
        Outcome::Cancelled => (
            ProposalState::Cancelled(concluded),
            ReferendaEvent::Cancelled { index, tally },
        ),
    };

    if log::log_enabled!(log::Level::Info) {
        info!("referendum {} concluded as {}", index, state.name());
    }
    ext.deposit_event(RuntimeEvent::Referenda(event));
    state
}

fn set_alarm(
    ext: &mut Ext,
    index: ReferendumIndex,
    status: &mut OngoingStatus,
    when: BlockNumber,
) -> DispatchResult {
    let when = when.max(ext.now.saturating_add(1));
    let name = alarm_name(index);
    let armed = ext.get_raw(&storage::lookup_key(&name)).is_some();
    if armed && status.alarm.map(|(at, _)| at) == Some(when) {
        return Ok(());
    }

    cancel_alarm(ext, index);
    let nudge = RuntimeCall::nudge_referendum(index).to_bytes();
    let task = Scheduled::named(name, CallDescriptor::inline(nudge), OriginCaller::Root)
        .with_priority(ALARM_PRIORITY);
    let address = scheduler::schedule(ext, when, task)?;
    status.alarm = Some((when, address));
    Ok(())
}

// The alarm may be the task being dispatched, whose lookup is already gone
fn cancel_alarm(ext: &mut Ext, index: ReferendumIndex) {
    let name = alarm_name(index);
    if ext.get_raw(&storage::lookup_key(&name)).is_some() {
        if let Err(e) = scheduler::cancel_named(ext, &name) {
            if log::log_enabled!(log::Level::Debug) {
                debug!("alarm of referendum {} not cancelled: {}", index, e);
            }
        }
    }
}

fn read_ongoing(ext: &Ext, index: ReferendumIndex) -> Result<OngoingStatus, DispatchError> {
    let state: ProposalState = ext
        .get(&storage::referendum_info_key(index))?
        .ok_or(DispatchError::BadReferendum(index))?;
    match state {
        ProposalState::Ongoing(status) => Ok(status),
        _ => Err(DispatchError::NotOngoing(index)),
    }
}

fn track_of<'a>(ext: &Ext<'a>, status: &OngoingStatus) -> Result<&'a TrackInfo, DispatchError> {
    ext.tracks.get(status.track).ok_or(DispatchError::NoTrack)
}

fn store(ext: &mut Ext, index: ReferendumIndex, state: &ProposalState) {
    ext.put(storage::referendum_info_key(index), state);
}
