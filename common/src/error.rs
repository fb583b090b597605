use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{crypto::Hash, referenda::ReferendumIndex};

/// Failure of a dispatched call. Recorded in events, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchError {
    #[error("Bad origin")]
    BadOrigin,

    #[error("Call bytes could not be decoded")]
    Undecodable,

    #[error("Preimage {0} is not available")]
    Unavailable(Hash),

    #[error("Preimage {0} already noted")]
    AlreadyNoted(Hash),

    #[error("No track for the proposal origin")]
    NoTrack,

    #[error("Referendum {0} not found")]
    BadReferendum(ReferendumIndex),

    #[error("Referendum {0} is not ongoing")]
    NotOngoing(ReferendumIndex),

    #[error("Decision deposit already placed")]
    HasDeposit,

    #[error("Named task not found")]
    NotFound,

    #[error("Task name already in use")]
    DuplicateName,

    #[error("Agenda slot {0} is full")]
    AgendaFull(u32),
}
