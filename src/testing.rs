//! Fixture builders for engine tests.
//!
//! Every fixture is anchored to a fixed clock so scores and due dates are
//! reproducible across runs.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::config::{Tuning, WeightConfig};
use crate::domain::{Difficulty, Item, ItemStat, Outcome, UserSnapshot};
use crate::scoring::{score_item, ScoreResult};
use crate::session::Candidate;
use crate::stats::recompute_tag_stats;

/// Fixed "now" shared by all fixtures.
pub fn now() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2026, 4, 15, 9, 0, 0).unwrap()
}

/// One item with its statistic and tag links.
#[derive(Debug, Clone)]
pub struct Entry {
  pub item: Item,
  pub stat: ItemStat,
  pub tags: Vec<i64>,
}

/// An item practised once, five days ago, passed at `confidence`.
pub fn entry(id: i64, difficulty: Difficulty, confidence: u8) -> Entry {
  let mut stat = ItemStat::new(id);
  stat.confidence = confidence;
  stat.avg_confidence = confidence as f64;
  stat.total_attempts = 1;
  stat.last_outcome = Some(Outcome::Passed);
  stat.last_attempt_at = Some(now() - Duration::days(5));
  stat.schedule.interval_days = 1;
  stat.schedule.review_count = 1;
  stat.schedule.next_review_at = Some(now() - Duration::days(4));

  Entry {
    item: Item::new(id, format!("Item {}", id), difficulty),
    stat,
    tags: Vec::new(),
  }
}

impl Entry {
  pub fn tags(mut self, tags: &[i64]) -> Self {
    self.tags = tags.to_vec();
    self
  }

  pub fn never_attempted(mut self) -> Self {
    let confidence = self.stat.confidence;
    self.stat = ItemStat::new(self.item.id);
    self.stat.confidence = confidence;
    self.stat.avg_confidence = confidence as f64;
    self
  }

  pub fn attempted_days_ago(mut self, days: i64) -> Self {
    self.stat.last_attempt_at = Some(now() - Duration::days(days));
    self.stat.schedule.next_review_at = Some(now() - Duration::days(days - 1));
    self
  }

  pub fn failed(mut self) -> Self {
    self.stat.last_outcome = Some(Outcome::Failed);
    self
  }

  pub fn attempts(mut self, n: u32) -> Self {
    self.stat.total_attempts = n;
    self
  }

  pub fn solve_seconds(mut self, seconds: u32) -> Self {
    self.stat.avg_solve_seconds = seconds;
    self.stat.timed_attempts = self.stat.timed_attempts.max(1);
    self
  }
}

/// Snapshot for user 1 built from `entries`, with tag stats derived from the
/// item statistics.
pub fn snapshot_with(entries: &[Entry]) -> UserSnapshot {
  let mut snapshot = UserSnapshot::new(1);
  for e in entries {
    snapshot.items.push(e.item.clone());
    snapshot.item_stats.push(e.stat.clone());
    snapshot.item_tags.insert(e.item.id, e.tags.clone());
  }
  snapshot.tag_stats = recompute_tag_stats(&snapshot.item_stats, &snapshot.item_tags);
  snapshot
}

/// Bare candidate with a fixed score, for allocator and shaping tests.
pub fn candidate(id: i64, difficulty: Difficulty, score: f64, tags: &[i64]) -> Candidate {
  let e = entry(id, difficulty, 50).tags(tags);
  let tuning = Tuning::default();
  let weights = WeightConfig::default();
  let mut scored: ScoreResult = score_item(&e.stat, difficulty, None, &weights, now(), &tuning);
  scored.score = score;
  Candidate::new(e.item, scored, e.stat, e.tags, now(), &tuning)
}
