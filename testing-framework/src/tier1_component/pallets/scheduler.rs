// Scheduler pallet: agenda servicing, named scheduling and cancellation

use log::debug;

use gov_common::{
    block::BlockNumber,
    call::{RuntimeCall, SchedulerCall},
    crypto::Hash,
    error::DispatchError,
    event::{RuntimeEvent, SchedulerEvent},
    origin::OriginCaller,
    scheduler::{
        AgendaSlot, CallDescriptor, Scheduled, TaskAddress, TaskName, MAX_SCHEDULED_PER_BLOCK,
    },
    serializer::Serializer,
    storage,
};

use super::preimage;
use crate::tier1_component::ext::{DispatchResult, Ext};

pub(crate) fn dispatch(ext: &mut Ext, origin: &OriginCaller, call: SchedulerCall) -> DispatchResult {
    match call {
        SchedulerCall::CancelNamed { id } => {
            ensure_root(origin)?;
            cancel_named(ext, &id)
        }
    }
}

pub(crate) fn ensure_root(origin: &OriginCaller) -> DispatchResult {
    match origin {
        OriginCaller::Root => Ok(()),
        _ => Err(DispatchError::BadOrigin),
    }
}

/// Append a task to the agenda of `when`, never earlier than the next block
pub(crate) fn schedule(ext: &mut Ext, when: BlockNumber, task: Scheduled) -> Result<TaskAddress, DispatchError> {
    let when = when.max(ext.now.saturating_add(1));

    if let Some(name) = task.name() {
        if ext.get_raw(&storage::lookup_key(name)).is_some() {
            return Err(DispatchError::DuplicateName);
        }
    }

    let key = storage::agenda_key(when);
    let mut agenda: AgendaSlot = ext.get(&key)?.unwrap_or_default();
    if agenda.iter().flatten().count() >= MAX_SCHEDULED_PER_BLOCK {
        return Err(DispatchError::AgendaFull(when));
    }

    // Reuse the first hole before growing the slot
    let position = match agenda.iter().position(Option::is_none) {
        Some(hole) => hole,
        None => {
            agenda.push(None);
            agenda.len() - 1
        }
    };
    let name = task.maybe_id;
    agenda[position] = Some(task);
    ext.put(key, &agenda);

    let address = (when, position as u32);
    if let Some(name) = name {
        ext.put(storage::lookup_key(&name), &address);
    }

    ext.deposit_event(RuntimeEvent::Scheduler(SchedulerEvent::Scheduled {
        when,
        index: address.1,
    }));
    Ok(address)
}

/// Remove a named task from wherever its lookup entry says it is
pub(crate) fn cancel_named(ext: &mut Ext, name: &TaskName) -> DispatchResult {
    let lookup_key = storage::lookup_key(name);
    let (when, index): TaskAddress = ext.get(&lookup_key)?.ok_or(DispatchError::NotFound)?;

    let key = storage::agenda_key(when);
    let mut agenda: AgendaSlot = ext.get(&key)?.unwrap_or_default();
    match agenda.get_mut(index as usize) {
        Some(entry) if entry.as_ref().and_then(Scheduled::name) == Some(name) => {
            *entry = None;
        }
        _ => return Err(DispatchError::NotFound),
    }
    ext.remove(&lookup_key);

    if agenda.iter().all(Option::is_none) {
        ext.remove(&key);
    } else {
        ext.put(key, &agenda);
    }

    ext.deposit_event(RuntimeEvent::Scheduler(SchedulerEvent::Canceled { when, index }));
    Ok(())
}

/// Run every task due at the current block, by priority then position.
/// `dispatch` executes a decoded call with its origin.
pub(crate) fn service_agenda<F>(ext: &mut Ext, mut dispatch: F) -> Result<u32, DispatchError>
where
    F: FnMut(&mut Ext, &OriginCaller, RuntimeCall) -> DispatchResult,
{
    let now = ext.now;
    let key = storage::agenda_key(now);
    let agenda: AgendaSlot = match ext.get(&key)? {
        Some(agenda) => agenda,
        None => return Ok(0),
    };

    let mut order: Vec<(u8, usize)> = agenda
        .iter()
        .enumerate()
        .filter_map(|(position, task)| task.as_ref().map(|task| (task.priority, position)))
        .collect();
    order.sort();

    let mut executed = 0;
    for (_, position) in order {
        // Re-read: an earlier task may have cancelled this one
        let current: AgendaSlot = ext.get(&key)?.unwrap_or_default();
        let Some(Some(task)) = current.get(position).cloned() else {
            continue;
        };
        let address = (now, position as u32);

        if let Some(name) = task.name() {
            ext.remove(&storage::lookup_key(name));
        }

        let Some(bytes) = resolve(ext, &task.call)? else {
            if log::log_enabled!(log::Level::Debug) {
                debug!("call {} of task {:?} is unavailable", task.call.content_hash(), address);
            }
            ext.deposit_event(RuntimeEvent::Scheduler(SchedulerEvent::CallUnavailable {
                task: address,
                id: task.maybe_id,
            }));
            continue;
        };

        let result = match RuntimeCall::from_bytes(&bytes) {
            // A failed call leaves no writes or events behind
            Ok(call) => ext.with_transaction(|ext| dispatch(ext, &task.origin, call)),
            Err(_) => Err(DispatchError::Undecodable),
        };
        executed += 1;

        if log::log_enabled!(log::Level::Debug) {
            debug!("dispatched task {:?} at block {}: {:?}", address, now, result);
        }
        ext.deposit_event(RuntimeEvent::Scheduler(SchedulerEvent::Dispatched {
            task: address,
            id: task.maybe_id,
            result,
        }));

        if let Some((period, remaining)) = task.maybe_periodic {
            if remaining > 1 {
                let mut next = task.clone();
                next.maybe_periodic = Some((period, remaining - 1));
                schedule(ext, now.saturating_add(period), next)?;
            }
        }
    }

    ext.remove(&key);
    Ok(executed)
}

/// Fetch the encoded call a descriptor refers to
pub(crate) fn resolve(ext: &Ext, call: &CallDescriptor) -> Result<Option<Vec<u8>>, DispatchError> {
    Ok(match call {
        CallDescriptor::Inline(bytes) => Some(bytes.clone()),
        CallDescriptor::Lookup { hash, len } => preimage::fetch(ext, hash, *len),
        CallDescriptor::Legacy { hash } => match preimage::len(ext, hash)? {
            Some(len) => preimage::fetch(ext, hash, len),
            None => None,
        },
    })
}

/// Deterministic task name derived from a domain tag and an index
pub fn task_name(domain: &[u8], index: u32) -> TaskName {
    let mut bytes = Vec::with_capacity(domain.len() + 4);
    bytes.extend_from_slice(domain);
    bytes.extend_from_slice(&index.to_le_bytes());
    Hash::to_bytes(gov_common::crypto::hash(&bytes))
}
