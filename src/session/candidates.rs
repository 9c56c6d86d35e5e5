//! Candidate assembly: joins scores with reference data, statistics and tags.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{Tuning, QUICK_WIN_MINUTES};
use crate::domain::{Difficulty, Item, ItemStat, PriorityStatus, UserSnapshot};
use crate::scoring::ScoreResult;

/// A scored item ready for selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
  pub item: Item,
  pub score: ScoreResult,
  pub stat: ItemStat,
  pub tags: Vec<i64>,
  pub estimated_minutes: u32,
  /// Whole days since the last attempt; None if never attempted
  pub days_since_last: Option<u32>,
  pub priority: PriorityStatus,
}

impl Candidate {
  pub fn new(
    item: Item,
    score: ScoreResult,
    stat: ItemStat,
    tags: Vec<i64>,
    now: DateTime<Utc>,
    tuning: &Tuning,
  ) -> Self {
    let estimated_minutes = tuning.estimates.minutes_for(item.difficulty);
    let days_since_last = stat.days_since_last(now).map(|d| d.floor() as u32);
    let priority = stat.priority_status(now, tuning.due_soon_days);

    Self {
      item,
      score,
      stat,
      tags,
      estimated_minutes,
      days_since_last,
      priority,
    }
  }

  pub fn id(&self) -> i64 {
    self.item.id
  }

  pub fn difficulty(&self) -> Difficulty {
    self.item.difficulty
  }

  pub fn is_quick_win(&self) -> bool {
    self.estimated_minutes <= QUICK_WIN_MINUTES
  }

  pub fn has_tag(&self, tag_id: i64) -> bool {
    self.tags.contains(&tag_id)
  }
}

/// Candidates in descending score order plus the number of items dropped
/// for missing reference, statistic or tag data.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
  pub candidates: Vec<Candidate>,
  pub skipped: usize,
}

/// Build the candidate pool from the snapshot and its scores.
///
/// Scores are consumed in the given order; the final sort is stable, so equal
/// scores keep that order. Statistics whose item record is missing never get
/// a score and are counted as skipped here.
pub fn build_candidates(
  snapshot: &UserSnapshot,
  scores: &[ScoreResult],
  now: DateTime<Utc>,
  tuning: &Tuning,
) -> CandidatePool {
  let items = snapshot.items_by_id();
  let stats = snapshot.stats_by_item();

  let scored: HashSet<i64> = scores.iter().map(|s| s.item_id).collect();

  let mut pool = CandidatePool::default();
  for stat in &snapshot.item_stats {
    if !items.contains_key(&stat.item_id) && !scored.contains(&stat.item_id) {
      tracing::debug!("Skipping candidate {}: no item record", stat.item_id);
      pool.skipped += 1;
    }
  }

  for score in scores {
    let item_id = score.item_id;
    let (Some(item), Some(stat), Some(tags)) = (
      items.get(&item_id),
      stats.get(&item_id),
      snapshot.tags_for(item_id),
    ) else {
      tracing::debug!("Skipping candidate {}: missing item, statistic or tag data", item_id);
      pool.skipped += 1;
      continue;
    };

    pool.candidates.push(Candidate::new(
      (*item).clone(),
      score.clone(),
      (*stat).clone(),
      tags.to_vec(),
      now,
      tuning,
    ));
  }

  pool
    .candidates
    .sort_by(|a, b| b.score.score.total_cmp(&a.score.score));

  if pool.skipped > 0 {
    tracing::warn!(
      "Skipped {} items for user {}: incomplete data",
      pool.skipped,
      snapshot.user_id
    );
  }
  pool
}
