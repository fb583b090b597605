//! Convenient re-exports for tests

pub use crate::backend::{MemoryBackend, StorageBackend};
pub use crate::config::FastForwardConfig;
pub use crate::fast_forward::{
    schedule_inline_call_with_origin, schedule_lookup_call_with_origin, AgendaStore,
    FastForwardError, ProposalStore, Task, TaskLocator, TaskRelocator,
};
pub use crate::invariants::{check_lookup_consistency, check_slot_capacity};
pub use crate::orchestrator::{fast_forward, FastForward, Stage};
pub use crate::tier1_component::{TestChain, TestChainBuilder};

pub use gov_common::{
    call::RuntimeCall,
    crypto::{hash, Hash},
    event::RuntimeEvent,
    origin::OriginCaller,
    referenda::{ProposalState, Tracks},
    scheduler::{CallDescriptor, DispatchTime, Scheduled},
    serializer::Serializer,
};
