pub mod item;
pub mod snapshot;
pub mod stat;

pub use item::{Difficulty, Item, Outcome};
pub use snapshot::UserSnapshot;
pub use stat::{HistoryEntry, ItemStat, PriorityStatus, ScheduleState, TagStat, DEFAULT_EASE_FACTOR};
