// Referenda Module
// Proposal/voting state persisted by the chain's referenda logic

mod perbill;
mod status;
mod tally;
mod track;

pub use perbill::*;
pub use status::*;
pub use tally::*;
pub use track::*;
