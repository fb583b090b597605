// Scheduler limits and priorities

/// Tasks with a priority at or below this value are never skipped for weight
pub const HARD_DEADLINE: u8 = 63;

/// Priority used for tasks the engine injects into the agenda
pub const DEFAULT_PRIORITY: u8 = 127;

/// Lowest possible task priority
pub const LOWEST_PRIORITY: u8 = 255;

/// Maximum number of filled entries a single agenda slot may hold. Holes do not count.
pub const MAX_SCHEDULED_PER_BLOCK: usize = 50;
