// Scheduler Module
// Types persisted by the chain's deferred-task queue: one agenda slot per
// block number, holding an ordered list of optional tasks, plus a side table
// mapping task names to their current address.

mod call;
mod constants;

use serde::{Deserialize, Serialize};

use crate::{block::BlockNumber, origin::OriginCaller, serializer::*};

pub use call::*;
pub use constants::*;

/// Human-assigned task identifier (usually a hash of a domain tuple)
pub type TaskName = [u8; 32];

/// Address of a task inside the agenda: `(slot, position)`
pub type TaskAddress = (BlockNumber, u32);

/// One agenda slot. Holes (`None`) keep sibling positions stable.
pub type AgendaSlot = Vec<Option<Scheduled>>;

/// When a dispatch should happen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchTime {
    /// At the given block number
    At(BlockNumber),
    /// The given number of blocks after the current one
    After(BlockNumber),
}

impl DispatchTime {
    pub fn id(&self) -> u8 {
        match self {
            DispatchTime::At(_) => 0,
            DispatchTime::After(_) => 1,
        }
    }

    /// Resolve to an absolute block number relative to `now`
    pub fn evaluate(&self, now: BlockNumber) -> BlockNumber {
        match self {
            DispatchTime::At(when) => *when,
            DispatchTime::After(delay) => now.saturating_add(*delay),
        }
    }
}

impl Serializer for DispatchTime {
    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let tag = reader.read_u8()?;
        match tag {
            0 => Ok(DispatchTime::At(BlockNumber::read(reader)?)),
            1 => Ok(DispatchTime::After(BlockNumber::read(reader)?)),
            _ => Err(ReaderError::UnknownTag {
                kind: "DispatchTime",
                tag,
            }),
        }
    }

    fn write(&self, writer: &mut Writer) {
        writer.write_u8(self.id());
        match self {
            DispatchTime::At(block) | DispatchTime::After(block) => block.write(writer),
        }
    }

    fn size(&self) -> usize {
        5
    }
}

/// A task as persisted in an agenda slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheduled {
    /// Name under which the task is registered in the lookup table
    pub maybe_id: Option<TaskName>,
    pub priority: u8,
    pub call: CallDescriptor,
    /// `(period, remaining repetitions)` for periodic tasks
    pub maybe_periodic: Option<(BlockNumber, u32)>,
    pub origin: OriginCaller,
}

impl Scheduled {
    /// An anonymous, one-shot task
    pub fn new(call: CallDescriptor, origin: OriginCaller) -> Self {
        Self {
            maybe_id: None,
            priority: DEFAULT_PRIORITY,
            call,
            maybe_periodic: None,
            origin,
        }
    }

    /// A named, one-shot task
    pub fn named(name: TaskName, call: CallDescriptor, origin: OriginCaller) -> Self {
        Self {
            maybe_id: Some(name),
            ..Self::new(call, origin)
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn name(&self) -> Option<&TaskName> {
        self.maybe_id.as_ref()
    }
}

impl Serializer for Scheduled {
    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Self {
            maybe_id: Option::read(reader)?,
            priority: u8::read(reader)?,
            call: CallDescriptor::read(reader)?,
            maybe_periodic: Option::read(reader)?,
            origin: OriginCaller::read(reader)?,
        })
    }

    fn write(&self, writer: &mut Writer) {
        self.maybe_id.write(writer);
        self.priority.write(writer);
        self.call.write(writer);
        self.maybe_periodic.write(writer);
        self.origin.write(writer);
    }

    fn size(&self) -> usize {
        self.maybe_id.size()
            + self.priority.size()
            + self.call.size()
            + self.maybe_periodic.size()
            + self.origin.size()
    }
}
