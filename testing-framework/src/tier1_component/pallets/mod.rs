// Runtime logic of the test chain, one module per pallet

pub mod preimage;
pub mod referenda;
pub mod scheduler;
pub mod system;

pub use referenda::{alarm_name, enactment_name};
