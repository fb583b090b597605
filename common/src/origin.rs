// Dispatch origins understood by the simulated chain

use serde::{Deserialize, Serialize};

use crate::{crypto::AccountId, serializer::*};

/// Custom governance origin, one per referenda track family
pub type TrackOrigin = u8;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginCaller {
    Root,
    Signed(AccountId),
    Origins(TrackOrigin),
}

impl OriginCaller {
    pub fn id(&self) -> u8 {
        match self {
            OriginCaller::Root => 0,
            OriginCaller::Signed(_) => 1,
            OriginCaller::Origins(_) => 2,
        }
    }

    pub fn as_signed(&self) -> Option<&AccountId> {
        match self {
            OriginCaller::Signed(who) => Some(who),
            _ => None,
        }
    }
}

impl Serializer for OriginCaller {
    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let tag = reader.read_u8()?;
        match tag {
            0 => Ok(OriginCaller::Root),
            1 => Ok(OriginCaller::Signed(AccountId::read(reader)?)),
            2 => Ok(OriginCaller::Origins(reader.read_u8()?)),
            _ => Err(ReaderError::UnknownTag {
                kind: "OriginCaller",
                tag,
            }),
        }
    }

    fn write(&self, writer: &mut Writer) {
        writer.write_u8(self.id());
        match self {
            OriginCaller::Root => {}
            OriginCaller::Signed(who) => who.write(writer),
            OriginCaller::Origins(origin) => writer.write_u8(*origin),
        }
    }

    fn size(&self) -> usize {
        1 + match self {
            OriginCaller::Root => 0,
            OriginCaller::Signed(who) => who.size(),
            OriginCaller::Origins(_) => 1,
        }
    }
}
