pub mod sm2;

pub use sm2::{advance_schedule, MIN_EASE_FACTOR};
