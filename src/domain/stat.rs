use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Outcome;

/// SM-2 ease factor assigned to items that have never been scheduled.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Spaced-repetition state carried on every item statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleState {
  pub interval_days: u32,
  pub ease_factor: f64,
  pub next_review_at: Option<DateTime<Utc>>,
  pub review_count: u32,
}

impl Default for ScheduleState {
  fn default() -> Self {
    Self {
      interval_days: 0,
      ease_factor: DEFAULT_EASE_FACTOR,
      next_review_at: None,
      review_count: 0,
    }
  }
}

/// One entry of the capped recent-attempt history, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub performed_at: DateTime<Utc>,
  pub outcome: Outcome,
  pub confidence: u8,
}

/// Per (user, item) aggregate of practice history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStat {
  pub item_id: i64,
  /// Confidence reported on the latest attempt, 0-100
  pub confidence: u8,
  /// Mean confidence across all attempts, 0-100
  pub avg_confidence: f64,
  pub total_attempts: u32,
  pub avg_solve_seconds: u32,
  /// Attempts that reported a duration (denominator of `avg_solve_seconds`)
  #[serde(default)]
  pub timed_attempts: u32,
  #[serde(default)]
  pub last_outcome: Option<Outcome>,
  #[serde(default)]
  pub last_attempt_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub schedule: ScheduleState,
  #[serde(default)]
  pub recent_history: VecDeque<HistoryEntry>,
}

impl ItemStat {
  /// Statistic for an item that was added to the library but never practised.
  pub fn new(item_id: i64) -> Self {
    Self {
      item_id,
      confidence: 50,
      avg_confidence: 50.0,
      total_attempts: 0,
      avg_solve_seconds: 0,
      timed_attempts: 0,
      last_outcome: None,
      last_attempt_at: None,
      schedule: ScheduleState::default(),
      recent_history: VecDeque::new(),
    }
  }

  /// Fractional days since the last attempt, or None if never attempted.
  pub fn days_since_last(&self, now: DateTime<Utc>) -> Option<f64> {
    self
      .last_attempt_at
      .map(|last| ((now - last).num_seconds() as f64 / 86_400.0).max(0.0))
  }

  pub fn priority_status(&self, now: DateTime<Utc>, due_soon_days: u32) -> PriorityStatus {
    if self.total_attempts == 0 {
      return PriorityStatus::New;
    }
    PriorityStatus::classify(self.schedule.next_review_at, now, due_soon_days)
  }
}

/// Per (user, tag) aggregate derived from the item statistics carrying the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagStat {
  pub tag_id: i64,
  pub avg_confidence: f64,
  pub times_revised: u32,
}

/// Review urgency bucket derived from the scheduled due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityStatus {
  New,
  Overdue,
  DueSoon,
  OnTrack,
}

impl PriorityStatus {
  pub fn classify(
    next_review_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    due_soon_days: u32,
  ) -> Self {
    match next_review_at {
      None => Self::New,
      Some(due) if due < now => Self::Overdue,
      Some(due) if due - now <= Duration::days(due_soon_days as i64) => Self::DueSoon,
      Some(_) => Self::OnTrack,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::New => "new",
      Self::Overdue => "overdue",
      Self::DueSoon => "due_soon",
      Self::OnTrack => "on_track",
    }
  }
}
