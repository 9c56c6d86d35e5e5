use chrono::{DateTime, Duration, Utc};

use crate::domain::{Outcome, ScheduleState};

pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Longest interval a pass can schedule, about a hundred years
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

const FAIL_EASE_PENALTY: f64 = 0.2;
const MAX_EASE_BONUS: f64 = 0.15;
/// Confidence at or below which a pass leaves the ease factor unchanged
const BONUS_CONFIDENCE_FLOOR: f64 = 50.0;

/// Ease bonus for a passed attempt: 0 at confidence <= 50, rising linearly to 0.15 at 100.
fn ease_bonus(confidence: u8) -> f64 {
  let c = (confidence.min(100)) as f64;
  let span = 100.0 - BONUS_CONFIDENCE_FLOOR;
  MAX_EASE_BONUS * ((c - BONUS_CONFIDENCE_FLOOR) / span).clamp(0.0, 1.0)
}

/// Advance an item's schedule after one recorded attempt.
///
/// Failed: interval resets to 1 day, ease drops by 0.2 (floored at 1.3).
/// Passed: ease grows with confidence, interval is multiplied by the new ease
/// and capped at `MAX_INTERVAL_DAYS`.
/// The review count increments either way.
pub fn advance_schedule(
  previous: &ScheduleState,
  outcome: Outcome,
  confidence: u8,
  now: DateTime<Utc>,
) -> ScheduleState {
  let current_ease = previous.ease_factor.max(MIN_EASE_FACTOR);

  let (interval_days, ease_factor) = match outcome {
    Outcome::Failed => (1, (current_ease - FAIL_EASE_PENALTY).max(MIN_EASE_FACTOR)),
    Outcome::Passed => {
      let ease = current_ease + ease_bonus(confidence);
      let grown = (previous.interval_days as f64 * ease).round();
      let interval = grown.clamp(1.0, MAX_INTERVAL_DAYS as f64) as u32;
      (interval.max(previous.interval_days.min(MAX_INTERVAL_DAYS)), ease)
    }
  };

  tracing::debug!(
    "[SM-2] {:?} at confidence {}: ease {:.2} -> {:.2}, interval {}d -> {}d",
    outcome,
    confidence,
    previous.ease_factor,
    ease_factor,
    previous.interval_days,
    interval_days
  );

  ScheduleState {
    interval_days,
    ease_factor,
    next_review_at: Some(
      now
        .checked_add_signed(Duration::days(interval_days as i64))
        .unwrap_or(DateTime::<Utc>::MAX_UTC),
    ),
    review_count: previous.review_count.saturating_add(1),
  }
}
