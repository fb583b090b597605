use serde::{Deserialize, Serialize};

use super::Perbill;
use crate::serializer::*;

/// Vote totals of an ongoing referendum
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub ayes: u128,
    pub nays: u128,
    pub support: u128,
}

impl Tally {
    /// Share of ayes among all cast votes
    pub fn approval(&self) -> Perbill {
        Perbill::from_rational(self.ayes, self.ayes.saturating_add(self.nays))
    }

    /// Share of the total issuance backing the referendum
    pub fn support(&self, total_issuance: u128) -> Perbill {
        Perbill::from_rational(self.support, total_issuance)
    }
}

impl Serializer for Tally {
    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Self {
            ayes: u128::read(reader)?,
            nays: u128::read(reader)?,
            support: u128::read(reader)?,
        })
    }

    fn write(&self, writer: &mut Writer) {
        self.ayes.write(writer);
        self.nays.write(writer);
        self.support.write(writer);
    }

    fn size(&self) -> usize {
        48
    }
}
