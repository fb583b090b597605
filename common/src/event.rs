// Events emitted by the simulated chain, one list per block

use serde::{Deserialize, Serialize};

use crate::{
    block::BlockNumber,
    crypto::{AccountId, Hash},
    error::DispatchError,
    referenda::{ReferendumIndex, Tally, TrackId},
    scheduler::{CallDescriptor, TaskAddress, TaskName},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemEvent {
    Remarked { hash: Hash },
    StorageSet { items: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerEvent {
    Scheduled {
        when: BlockNumber,
        index: u32,
    },
    Canceled {
        when: BlockNumber,
        index: u32,
    },
    Dispatched {
        task: TaskAddress,
        id: Option<TaskName>,
        result: Result<(), DispatchError>,
    },
    /// The call of a task could not be resolved and the task was dropped
    CallUnavailable {
        task: TaskAddress,
        id: Option<TaskName>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreimageEvent {
    Noted { hash: Hash },
    Cleared { hash: Hash },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferendaEvent {
    Submitted {
        index: ReferendumIndex,
        track: TrackId,
        proposal: CallDescriptor,
    },
    DecisionDepositPlaced {
        index: ReferendumIndex,
        who: AccountId,
        amount: u128,
    },
    DecisionStarted {
        index: ReferendumIndex,
        track: TrackId,
        proposal: CallDescriptor,
        tally: Tally,
    },
    ConfirmStarted {
        index: ReferendumIndex,
    },
    ConfirmAborted {
        index: ReferendumIndex,
    },
    Confirmed {
        index: ReferendumIndex,
        tally: Tally,
    },
    Approved {
        index: ReferendumIndex,
    },
    Rejected {
        index: ReferendumIndex,
        tally: Tally,
    },
    TimedOut {
        index: ReferendumIndex,
        tally: Tally,
    },
    Cancelled {
        index: ReferendumIndex,
        tally: Tally,
    },
    Killed {
        index: ReferendumIndex,
        tally: Tally,
    },
}

/// `(task address, task name, dispatch result)` of a `Dispatched` event
pub type DispatchView<'a> = (
    &'a TaskAddress,
    Option<&'a TaskName>,
    &'a Result<(), DispatchError>,
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeEvent {
    System(SystemEvent),
    Scheduler(SchedulerEvent),
    Preimage(PreimageEvent),
    Referenda(ReferendaEvent),
}

impl RuntimeEvent {
    /// Index of the submitted referendum, if this is a submission event
    pub fn submitted_index(&self) -> Option<(ReferendumIndex, TrackId)> {
        match self {
            RuntimeEvent::Referenda(ReferendaEvent::Submitted { index, track, .. }) => {
                Some((*index, *track))
            }
            _ => None,
        }
    }

    pub fn is_approved(&self, referendum: ReferendumIndex) -> bool {
        matches!(
            self,
            RuntimeEvent::Referenda(ReferendaEvent::Approved { index }) if *index == referendum
        )
    }

    /// Agenda address of a newly scheduled task
    pub fn scheduled_address(&self) -> Option<TaskAddress> {
        match self {
            RuntimeEvent::Scheduler(SchedulerEvent::Scheduled { when, index }) => {
                Some((*when, *index))
            }
            _ => None,
        }
    }

    /// Result of a dispatched task, if this is a dispatch event
    pub fn dispatch_result(&self) -> Option<DispatchView<'_>> {
        match self {
            RuntimeEvent::Scheduler(SchedulerEvent::Dispatched { task, id, result }) => {
                Some((task, id.as_ref(), result))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_helpers() {
        let submitted = RuntimeEvent::Referenda(ReferendaEvent::Submitted {
            index: 3,
            track: 14,
            proposal: CallDescriptor::lookup(b"x"),
        });
        assert_eq!(submitted.submitted_index(), Some((3, 14)));
        assert!(!submitted.is_approved(3));

        let approved = RuntimeEvent::Referenda(ReferendaEvent::Approved { index: 3 });
        assert!(approved.is_approved(3));
        assert!(!approved.is_approved(4));
        assert!(approved.scheduled_address().is_none());

        let scheduled = RuntimeEvent::Scheduler(SchedulerEvent::Scheduled { when: 14_404, index: 2 });
        assert_eq!(scheduled.scheduled_address(), Some((14_404, 2)));

        let dispatched = RuntimeEvent::Scheduler(SchedulerEvent::Dispatched {
            task: (5, 0),
            id: None,
            result: Err(DispatchError::BadOrigin),
        });
        let (task, id, result) = dispatched.dispatch_result().unwrap();
        assert_eq!(task, &(5, 0));
        assert!(id.is_none());
        assert!(result.is_err());
    }

    #[test]
    fn test_events_serialize_to_json() {
        let event = RuntimeEvent::Scheduler(SchedulerEvent::Scheduled { when: 7, index: 1 });
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"scheduler":{"scheduled":{"when":7,"index":1}}}"#);
    }
}
