// Runtime calls understood by the simulated chain.
//
// Every call is encoded as `pallet index ++ call index ++ arguments`.

use serde::{Deserialize, Serialize};

use crate::{
    crypto::{hash, Hash},
    origin::OriginCaller,
    referenda::ReferendumIndex,
    scheduler::{CallDescriptor, DispatchTime, TaskName},
    serializer::*,
};

pub const SYSTEM_PALLET: u8 = 0;
pub const SCHEDULER_PALLET: u8 = 1;
pub const PREIMAGE_PALLET: u8 = 10;
pub const REFERENDA_PALLET: u8 = 21;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemCall {
    Remark { remark: Vec<u8> },
    SetStorage { items: Vec<(Vec<u8>, Vec<u8>)> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerCall {
    CancelNamed { id: TaskName },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreimageCall {
    NotePreimage { bytes: Vec<u8> },
    UnnotePreimage { hash: Hash },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferendaCall {
    Submit {
        proposal_origin: OriginCaller,
        proposal: CallDescriptor,
        enactment_moment: DispatchTime,
    },
    PlaceDecisionDeposit {
        index: ReferendumIndex,
    },
    Cancel {
        index: ReferendumIndex,
    },
    Kill {
        index: ReferendumIndex,
    },
    NudgeReferendum {
        index: ReferendumIndex,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeCall {
    System(SystemCall),
    Scheduler(SchedulerCall),
    Preimage(PreimageCall),
    Referenda(ReferendaCall),
}

impl RuntimeCall {
    pub fn remark(remark: Vec<u8>) -> Self {
        RuntimeCall::System(SystemCall::Remark { remark })
    }

    pub fn set_storage(items: Vec<(Vec<u8>, Vec<u8>)>) -> Self {
        RuntimeCall::System(SystemCall::SetStorage { items })
    }

    pub fn note_preimage(bytes: Vec<u8>) -> Self {
        RuntimeCall::Preimage(PreimageCall::NotePreimage { bytes })
    }

    pub fn nudge_referendum(index: ReferendumIndex) -> Self {
        RuntimeCall::Referenda(ReferendaCall::NudgeReferendum { index })
    }

    pub fn place_decision_deposit(index: ReferendumIndex) -> Self {
        RuntimeCall::Referenda(ReferendaCall::PlaceDecisionDeposit { index })
    }

    pub fn submit(
        proposal_origin: OriginCaller,
        proposal: CallDescriptor,
        enactment_moment: DispatchTime,
    ) -> Self {
        RuntimeCall::Referenda(ReferendaCall::Submit {
            proposal_origin,
            proposal,
            enactment_moment,
        })
    }

    /// Content hash of the encoded call, as a scheduler task would see it
    pub fn content_hash(&self) -> Hash {
        hash(&self.to_bytes())
    }

    /// `(pallet index, call index)`
    pub fn index(&self) -> (u8, u8) {
        match self {
            RuntimeCall::System(call) => (
                SYSTEM_PALLET,
                match call {
                    SystemCall::Remark { .. } => 0,
                    SystemCall::SetStorage { .. } => 1,
                },
            ),
            RuntimeCall::Scheduler(call) => (
                SCHEDULER_PALLET,
                match call {
                    SchedulerCall::CancelNamed { .. } => 3,
                },
            ),
            RuntimeCall::Preimage(call) => (
                PREIMAGE_PALLET,
                match call {
                    PreimageCall::NotePreimage { .. } => 0,
                    PreimageCall::UnnotePreimage { .. } => 1,
                },
            ),
            RuntimeCall::Referenda(call) => (
                REFERENDA_PALLET,
                match call {
                    ReferendaCall::Submit { .. } => 0,
                    ReferendaCall::PlaceDecisionDeposit { .. } => 1,
                    ReferendaCall::Cancel { .. } => 3,
                    ReferendaCall::Kill { .. } => 4,
                    ReferendaCall::NudgeReferendum { .. } => 5,
                },
            ),
        }
    }
}

impl Serializer for RuntimeCall {
    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let pallet = reader.read_u8()?;
        let call = reader.read_u8()?;
        let unknown = ReaderError::UnknownTag {
            kind: "RuntimeCall",
            tag: call,
        };

        Ok(match (pallet, call) {
            (SYSTEM_PALLET, 0) => RuntimeCall::remark(Vec::read(reader)?),
            (SYSTEM_PALLET, 1) => RuntimeCall::set_storage(Vec::read(reader)?),
            (SCHEDULER_PALLET, 3) => RuntimeCall::Scheduler(SchedulerCall::CancelNamed {
                id: TaskName::read(reader)?,
            }),
            (PREIMAGE_PALLET, 0) => RuntimeCall::note_preimage(Vec::read(reader)?),
            (PREIMAGE_PALLET, 1) => RuntimeCall::Preimage(PreimageCall::UnnotePreimage {
                hash: Hash::read(reader)?,
            }),
            (REFERENDA_PALLET, 0) => RuntimeCall::submit(
                OriginCaller::read(reader)?,
                CallDescriptor::read(reader)?,
                DispatchTime::read(reader)?,
            ),
            (REFERENDA_PALLET, 1) => RuntimeCall::place_decision_deposit(u32::read(reader)?),
            (REFERENDA_PALLET, 3) => RuntimeCall::Referenda(ReferendaCall::Cancel {
                index: u32::read(reader)?,
            }),
            (REFERENDA_PALLET, 4) => RuntimeCall::Referenda(ReferendaCall::Kill {
                index: u32::read(reader)?,
            }),
            (REFERENDA_PALLET, 5) => RuntimeCall::nudge_referendum(u32::read(reader)?),
            (SYSTEM_PALLET | SCHEDULER_PALLET | PREIMAGE_PALLET | REFERENDA_PALLET, _) => {
                return Err(unknown)
            }
            _ => {
                return Err(ReaderError::UnknownTag {
                    kind: "pallet",
                    tag: pallet,
                })
            }
        })
    }

    fn write(&self, writer: &mut Writer) {
        let (pallet, call) = self.index();
        writer.write_u8(pallet);
        writer.write_u8(call);
        match self {
            RuntimeCall::System(SystemCall::Remark { remark }) => remark.write(writer),
            RuntimeCall::System(SystemCall::SetStorage { items }) => items.write(writer),
            RuntimeCall::Scheduler(SchedulerCall::CancelNamed { id }) => id.write(writer),
            RuntimeCall::Preimage(PreimageCall::NotePreimage { bytes }) => bytes.write(writer),
            RuntimeCall::Preimage(PreimageCall::UnnotePreimage { hash }) => hash.write(writer),
            RuntimeCall::Referenda(ReferendaCall::Submit {
                proposal_origin,
                proposal,
                enactment_moment,
            }) => {
                proposal_origin.write(writer);
                proposal.write(writer);
                enactment_moment.write(writer);
            }
            RuntimeCall::Referenda(
                ReferendaCall::PlaceDecisionDeposit { index }
                | ReferendaCall::Cancel { index }
                | ReferendaCall::Kill { index }
                | ReferendaCall::NudgeReferendum { index },
            ) => index.write(writer),
        }
    }
}
