// Block numbers are the only notion of time the simulated chain has.
// One agenda slot exists per block number.
pub type BlockNumber = u32;
