// Referendum lifecycle as persisted in `Referenda::ReferendumInfoFor`

use serde::{Deserialize, Serialize};

use super::{Tally, TrackId};
use crate::{
    block::BlockNumber,
    crypto::AccountId,
    origin::OriginCaller,
    scheduler::{CallDescriptor, DispatchTime, TaskAddress},
    serializer::*,
};

pub type ReferendumIndex = u32;

/// `(when the next nudge is due, address of the scheduled nudge task)`
pub type Alarm = (BlockNumber, TaskAddress);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub who: AccountId,
    pub amount: u128,
}

impl Serializer for Deposit {
    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Self {
            who: AccountId::read(reader)?,
            amount: u128::read(reader)?,
        })
    }

    fn write(&self, writer: &mut Writer) {
        self.who.write(writer);
        self.amount.write(writer);
    }

    fn size(&self) -> usize {
        self.who.size() + self.amount.size()
    }
}

/// The deciding phase started at `since`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecidingWindow {
    pub since: BlockNumber,
}

/// Confirmation completes once the chain reaches `until`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmingWindow {
    pub until: BlockNumber,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OngoingStatus {
    pub track: TrackId,
    /// Origin the proposal will be dispatched with once enacted
    pub origin: OriginCaller,
    pub proposal: CallDescriptor,
    pub enactment: DispatchTime,
    pub submitted: BlockNumber,
    pub submission_deposit: Deposit,
    pub decision_deposit: Option<Deposit>,
    pub deciding: Option<DecidingWindow>,
    pub confirming: Option<ConfirmingWindow>,
    pub tally: Tally,
    pub alarm: Option<Alarm>,
}

impl Serializer for OngoingStatus {
    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Self {
            track: TrackId::read(reader)?,
            origin: OriginCaller::read(reader)?,
            proposal: CallDescriptor::read(reader)?,
            enactment: DispatchTime::read(reader)?,
            submitted: BlockNumber::read(reader)?,
            submission_deposit: Deposit::read(reader)?,
            decision_deposit: Option::read(reader)?,
            deciding: Option::<BlockNumber>::read(reader)?.map(|since| DecidingWindow { since }),
            confirming: Option::<BlockNumber>::read(reader)?
                .map(|until| ConfirmingWindow { until }),
            tally: Tally::read(reader)?,
            alarm: Option::read(reader)?,
        })
    }

    fn write(&self, writer: &mut Writer) {
        self.track.write(writer);
        self.origin.write(writer);
        self.proposal.write(writer);
        self.enactment.write(writer);
        self.submitted.write(writer);
        self.submission_deposit.write(writer);
        self.decision_deposit.write(writer);
        self.deciding.map(|d| d.since).write(writer);
        self.confirming.map(|c| c.until).write(writer);
        self.tally.write(writer);
        self.alarm.write(writer);
    }
}

/// Final bookkeeping of a concluded referendum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concluded {
    pub at: BlockNumber,
    pub submission_deposit: Option<Deposit>,
    pub decision_deposit: Option<Deposit>,
}

impl Serializer for Concluded {
    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Self {
            at: BlockNumber::read(reader)?,
            submission_deposit: Option::read(reader)?,
            decision_deposit: Option::read(reader)?,
        })
    }

    fn write(&self, writer: &mut Writer) {
        self.at.write(writer);
        self.submission_deposit.write(writer);
        self.decision_deposit.write(writer);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalState {
    Ongoing(OngoingStatus),
    Approved(Concluded),
    Rejected(Concluded),
    Cancelled(Concluded),
    TimedOut(Concluded),
    Killed(BlockNumber),
}

impl ProposalState {
    pub fn id(&self) -> u8 {
        match self {
            ProposalState::Ongoing(_) => 0,
            ProposalState::Approved(_) => 1,
            ProposalState::Rejected(_) => 2,
            ProposalState::Cancelled(_) => 3,
            ProposalState::TimedOut(_) => 4,
            ProposalState::Killed(_) => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProposalState::Ongoing(_) => "ongoing",
            ProposalState::Approved(_) => "approved",
            ProposalState::Rejected(_) => "rejected",
            ProposalState::Cancelled(_) => "cancelled",
            ProposalState::TimedOut(_) => "timed_out",
            ProposalState::Killed(_) => "killed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProposalState::Ongoing(_))
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, ProposalState::Approved(_))
    }

    pub fn as_ongoing(&self) -> Option<&OngoingStatus> {
        match self {
            ProposalState::Ongoing(status) => Some(status),
            _ => None,
        }
    }
}

impl Serializer for ProposalState {
    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let tag = reader.read_u8()?;
        match tag {
            0 => Ok(ProposalState::Ongoing(OngoingStatus::read(reader)?)),
            1 => Ok(ProposalState::Approved(Concluded::read(reader)?)),
            2 => Ok(ProposalState::Rejected(Concluded::read(reader)?)),
            3 => Ok(ProposalState::Cancelled(Concluded::read(reader)?)),
            4 => Ok(ProposalState::TimedOut(Concluded::read(reader)?)),
            5 => Ok(ProposalState::Killed(BlockNumber::read(reader)?)),
            _ => Err(ReaderError::UnknownTag {
                kind: "ProposalState",
                tag,
            }),
        }
    }

    fn write(&self, writer: &mut Writer) {
        writer.write_u8(self.id());
        match self {
            ProposalState::Ongoing(status) => status.write(writer),
            ProposalState::Approved(concluded)
            | ProposalState::Rejected(concluded)
            | ProposalState::Cancelled(concluded)
            | ProposalState::TimedOut(concluded) => concluded.write(writer),
            ProposalState::Killed(at) => at.write(writer),
        }
    }
}

/// A referendum together with its index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ReferendumIndex,
    pub state: ProposalState,
}

impl Proposal {
    pub fn track(&self) -> Option<TrackId> {
        self.state.as_ongoing().map(|status| status.track)
    }

    pub fn origin(&self) -> Option<&OriginCaller> {
        self.state.as_ongoing().map(|status| &status.origin)
    }

    pub fn submission_deposit(&self) -> Option<&Deposit> {
        match &self.state {
            ProposalState::Ongoing(status) => Some(&status.submission_deposit),
            ProposalState::Approved(c)
            | ProposalState::Rejected(c)
            | ProposalState::Cancelled(c)
            | ProposalState::TimedOut(c) => c.submission_deposit.as_ref(),
            ProposalState::Killed(_) => None,
        }
    }

    pub fn decision_deposit(&self) -> Option<&Deposit> {
        match &self.state {
            ProposalState::Ongoing(status) => status.decision_deposit.as_ref(),
            ProposalState::Approved(c)
            | ProposalState::Rejected(c)
            | ProposalState::Cancelled(c)
            | ProposalState::TimedOut(c) => c.decision_deposit.as_ref(),
            ProposalState::Killed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Hash;

    fn ongoing() -> OngoingStatus {
        OngoingStatus {
            track: 0,
            origin: OriginCaller::Root,
            proposal: CallDescriptor::lookup(b"proposal"),
            enactment: DispatchTime::After(1),
            submitted: 10,
            submission_deposit: Deposit {
                who: Hash::new([1; 32]),
                amount: 10,
            },
            decision_deposit: None,
            deciding: Some(DecidingWindow { since: 11 }),
            confirming: None,
            tally: Tally::default(),
            alarm: Some((20, (20, 0))),
        }
    }

    #[test]
    fn test_ongoing_state_bytes_are_stable() {
        let state = ProposalState::Ongoing(ongoing());
        let bytes = state.to_bytes();
        let decoded = ProposalState::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, state);
        assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ProposalState::Ongoing(ongoing()).is_terminal());
        assert!(ProposalState::Killed(3).is_terminal());
        let approved = ProposalState::Approved(Concluded {
            at: 5,
            submission_deposit: None,
            decision_deposit: None,
        });
        assert!(approved.is_terminal());
        assert!(approved.is_approved());
        assert_eq!(approved.name(), "approved");
    }

    #[test]
    fn test_proposal_views() {
        let proposal = Proposal {
            id: 4,
            state: ProposalState::Ongoing(ongoing()),
        };
        assert_eq!(proposal.track(), Some(0));
        assert_eq!(proposal.origin(), Some(&OriginCaller::Root));
        assert_eq!(proposal.submission_deposit().unwrap().amount, 10);
        assert!(proposal.decision_deposit().is_none());
    }
}
