use thiserror::Error;

use gov_common::{
    block::BlockNumber,
    crypto::Hash,
    referenda::{ProposalState, ReferendumIndex, TrackId},
    scheduler::TaskAddress,
    serializer::ReaderError,
};

/// Errors raised while fast-forwarding a proposal.
/// None of them is retried: the caller must reset the chain.
#[derive(Debug, Error)]
pub enum FastForwardError {
    #[error("No scheduled call with content hash {0} found")]
    NoScheduledCallFound(Hash),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Referendum {index} ended as {}, expected approved: {state:?}", .state.name())]
    TerminalStateMismatch {
        index: ReferendumIndex,
        state: Box<ProposalState>,
    },

    #[error("Unrecognized call encoding tag {tag} in agenda slot {slot}")]
    UnrecognizedCallEncoding { slot: BlockNumber, tag: u8 },

    #[error("Referendum {0} not found")]
    ProposalNotFound(ReferendumIndex),

    #[error("Referendum {index} was assigned track {actual}, expected {expected}")]
    TrackMismatch {
        index: ReferendumIndex,
        expected: TrackId,
        actual: TrackId,
    },

    #[error("Missing event: {0}")]
    MissingEvent(String),

    #[error("Stage {actual} reached out of order, expected {expected}")]
    OutOfOrder {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: ReaderError,
    },

    #[error("Backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl FastForwardError {
    pub fn invariant(message: impl Into<String>) -> Self {
        FastForwardError::InvariantViolation(message.into())
    }

    /// Map a codec error on the value of `what`, keeping unknown call tags distinct
    pub fn decode(what: &'static str, slot: Option<BlockNumber>, source: ReaderError) -> Self {
        match (source, slot) {
            (ReaderError::UnrecognizedCallEncoding(tag), Some(slot)) => {
                FastForwardError::UnrecognizedCallEncoding { slot, tag }
            }
            (source, _) => FastForwardError::Decode { what, source },
        }
    }

    pub fn moved_task(at: TaskAddress) -> Self {
        FastForwardError::invariant(format!(
            "task vanished from slot {} position {} during relocation",
            at.0, at.1
        ))
    }
}

pub type Result<T> = std::result::Result<T, FastForwardError>;
