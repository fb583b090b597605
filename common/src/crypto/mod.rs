mod hash;

pub use hash::*;

// Accounts are identified by a 32 byte public key hash
pub type AccountId = Hash;
