//! Item and tag statistics aggregation.
//!
//! Called by the attempt-recording collaborator once per attempt, inside the
//! same transaction that stores the attempt. Concurrent attempts on the same
//! item must be serialised by that collaborator.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{HistoryEntry, ItemStat, Outcome, TagStat};
use crate::srs;

/// A completed practice attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
  pub item_id: i64,
  pub outcome: Outcome,
  /// Self-reported confidence, 0-100
  pub confidence: u8,
  #[serde(default)]
  pub duration_seconds: Option<u32>,
  pub performed_at: DateTime<Utc>,
}

impl ItemStat {
  /// Fold one attempt into the aggregate and advance the review schedule.
  pub fn record_attempt(&mut self, attempt: &AttemptRecord, history_len: usize) {
    let confidence = attempt.confidence.min(100);
    let n = self.total_attempts as f64;

    self.avg_confidence = if self.total_attempts == 0 {
      confidence as f64
    } else {
      (self.avg_confidence * n + confidence as f64) / (n + 1.0)
    };
    self.confidence = confidence;
    self.total_attempts += 1;

    if let Some(seconds) = attempt.duration_seconds {
      let timed = self.timed_attempts as u64;
      let total = self.avg_solve_seconds as u64 * timed + seconds as u64;
      self.timed_attempts += 1;
      self.avg_solve_seconds = (total / (timed + 1)) as u32;
    }

    self.last_outcome = Some(attempt.outcome);
    self.last_attempt_at = Some(attempt.performed_at);

    self.recent_history.push_front(HistoryEntry {
      performed_at: attempt.performed_at,
      outcome: attempt.outcome,
      confidence,
    });
    self.recent_history.truncate(history_len);

    self.schedule =
      srs::advance_schedule(&self.schedule, attempt.outcome, confidence, attempt.performed_at);

    tracing::info!(
      "Recorded {} attempt on item {}: confidence {} (avg {:.1}), next review in {}d",
      attempt.outcome.as_str(),
      self.item_id,
      confidence,
      self.avg_confidence,
      self.schedule.interval_days
    );
  }
}

/// Recompute every tag aggregate from the item statistics.
///
/// A tag's average confidence is the mean of `avg_confidence` over the items
/// carrying it; `times_revised` sums their attempts. Tags with no item
/// statistics are omitted. Output is ordered by tag id.
pub fn recompute_tag_stats(
  item_stats: &[ItemStat],
  item_tags: &BTreeMap<i64, Vec<i64>>,
) -> Vec<TagStat> {
  // tag id -> (confidence sum, item count, attempts)
  let mut totals: BTreeMap<i64, (f64, u32, u32)> = BTreeMap::new();

  for stat in item_stats {
    let Some(tags) = item_tags.get(&stat.item_id) else {
      continue;
    };
    for &tag_id in tags {
      let entry = totals.entry(tag_id).or_insert((0.0, 0, 0));
      entry.0 += stat.avg_confidence;
      entry.1 += 1;
      entry.2 += stat.total_attempts;
    }
  }

  totals
    .into_iter()
    .map(|(tag_id, (sum, count, attempts))| TagStat {
      tag_id,
      avg_confidence: sum / count as f64,
      times_revised: attempts,
    })
    .collect()
}
