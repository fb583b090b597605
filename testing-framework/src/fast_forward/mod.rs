// File: testing-framework/src/fast_forward/mod.rs
//
// Fast-Forward Engine
//
// Reads a chain's scheduler and referenda state through a StorageBackend,
// synthesizes an approvable referendum and moves its pending nudge and
// enactment tasks to the next block.

pub mod agenda;
pub mod error;
pub mod inject;
pub mod locator;
pub mod referenda;
pub mod relocator;
pub mod tally;

pub use agenda::{AgendaStore, Task};
pub use error::{FastForwardError, Result};
pub use inject::{schedule_inline_call_with_origin, schedule_lookup_call_with_origin};
pub use locator::TaskLocator;
pub use referenda::ProposalStore;
pub use relocator::TaskRelocator;
pub use tally::{synthesize_approval, SynthesizedApproval};
