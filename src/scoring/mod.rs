//! Urgency scoring.
//!
//! Each item's statistics are normalised into seven features which are then
//! combined with the configured weights into a single score. The per-factor
//! contributions are kept, sorted, as the explanation of the score.

pub mod features;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{Tuning, WeightConfig};
use crate::domain::{Difficulty, ItemStat, UserSnapshot};

pub use features::{normalize, weakest_tag_confidence, Factor, Features};

/// Contributions at or below this value are left out of the summary
const SUMMARY_THRESHOLD: f64 = 0.01;
const SUMMARY_MAX_PARTS: usize = 3;

/// Per-template adjustment of the scoring weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringEmphasis {
  #[default]
  Standard,
  Confidence,
  Failure,
  Time,
}

impl ScoringEmphasis {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Standard => "standard",
      Self::Confidence => "confidence",
      Self::Failure => "failure",
      Self::Time => "time",
    }
  }
}

/// Boost the emphasised weight and renormalise so the weights sum to 1.
///
/// `Standard` returns the weights untouched.
pub fn apply_emphasis(weights: &WeightConfig, emphasis: ScoringEmphasis) -> WeightConfig {
  let mut w = *weights;
  match emphasis {
    ScoringEmphasis::Standard => return w,
    ScoringEmphasis::Confidence => w.confidence *= 2.0,
    ScoringEmphasis::Failure => w.failed *= 2.0,
    ScoringEmphasis::Time => w.time *= 3.0,
  }

  let total = w.total();
  if total > 0.0 {
    w.confidence /= total;
    w.days /= total;
    w.attempts /= total;
    w.time /= total;
    w.difficulty /= total;
    w.failed /= total;
    w.tag /= total;
  }
  w
}

/// One factor's share of an item's score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
  pub factor: Factor,
  pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
  pub item_id: i64,
  pub score: f64,
  /// Weighted contributions, largest first; ties keep factor order
  pub reason: Vec<Contribution>,
  pub features: Features,
  /// Short human-readable explanation built from the top contributors
  pub summary: String,
}

/// Weighted sum of the features plus the sorted contribution list.
pub fn weigh(features: &Features, weights: &WeightConfig) -> (f64, Vec<Contribution>) {
  let mut reason: Vec<Contribution> = features
    .pairs()
    .iter()
    .zip(weights.as_array())
    .map(|(&(factor, value), weight)| Contribution {
      factor,
      value: weight * value,
    })
    .collect();

  let score = reason.iter().map(|c| c.value).sum();

  // Vec::sort_by is stable, so equal contributions keep factor order
  reason.sort_by(|a, b| b.value.total_cmp(&a.value));

  (score, reason)
}

/// Score a single item.
pub fn score_item(
  stat: &ItemStat,
  difficulty: Difficulty,
  weakest_tag: Option<f64>,
  weights: &WeightConfig,
  now: DateTime<Utc>,
  tuning: &Tuning,
) -> ScoreResult {
  let features = normalize(stat, difficulty, weakest_tag, now, tuning);
  let (score, reason) = weigh(&features, weights);
  let summary = summarize(&reason, stat, difficulty, now);

  ScoreResult {
    item_id: stat.item_id,
    score,
    reason,
    features,
    summary,
  }
}

/// Score every item statistic in the snapshot, in snapshot order.
///
/// Statistics whose item has no reference data are skipped.
pub fn compute_scores(
  snapshot: &UserSnapshot,
  weights: &WeightConfig,
  now: DateTime<Utc>,
  tuning: &Tuning,
) -> Vec<ScoreResult> {
  let items = snapshot.items_by_id();
  let tag_stats = snapshot.tag_stats_by_id();

  let mut results = Vec::with_capacity(snapshot.item_stats.len());
  for stat in &snapshot.item_stats {
    let Some(item) = items.get(&stat.item_id) else {
      tracing::warn!(
        "Skipping score for item {} (user {}): no reference data",
        stat.item_id,
        snapshot.user_id
      );
      continue;
    };

    let tags = snapshot.tags_for(stat.item_id).unwrap_or(&[]);
    let weakest = weakest_tag_confidence(tags, &tag_stats);
    results.push(score_item(stat, item.difficulty, weakest, weights, now, tuning));
  }

  tracing::debug!(
    "Scored {} of {} items for user {}",
    results.len(),
    snapshot.item_stats.len(),
    snapshot.user_id
  );
  results
}

fn describe(factor: Factor, stat: &ItemStat, difficulty: Difficulty, now: DateTime<Utc>) -> String {
  match factor {
    Factor::Confidence => format!("confidence {}%", stat.confidence),
    Factor::Recency => match (stat.schedule.next_review_at, stat.days_since_last(now)) {
      (_, None) => "never attempted".to_string(),
      (Some(due), Some(_)) => {
        let overdue = (now - due).num_days();
        if overdue > 0 {
          format!("{} days overdue", overdue)
        } else if overdue == 0 {
          "due today".to_string()
        } else {
          format!("due in {} days", -overdue)
        }
      }
      (None, Some(days)) => format!("{} days since last", days.floor() as i64),
    },
    Factor::Attempts => format!("{} attempts", stat.total_attempts),
    Factor::Time => "long solve time".to_string(),
    Factor::Difficulty => format!("{} difficulty", difficulty.as_str()),
    Factor::Failure => "failed last attempt".to_string(),
    Factor::TagWeakness => "weak tag".to_string(),
  }
}

fn summarize(
  reason: &[Contribution],
  stat: &ItemStat,
  difficulty: Difficulty,
  now: DateTime<Utc>,
) -> String {
  let parts: Vec<String> = reason
    .iter()
    .filter(|c| c.value > SUMMARY_THRESHOLD)
    .take(SUMMARY_MAX_PARTS)
    .map(|c| describe(c.factor, stat, difficulty, now))
    .collect();

  if parts.is_empty() {
    "needs review".to_string()
  } else {
    parts.join(", ")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Outcome;
  use crate::testing;
  use chrono::Duration;

  #[test]
  fn test_score_is_weighted_sum() {
    let features = Features {
      confidence: 0.6,
      recency: 0.5,
      attempts: 0.2,
      time: 0.5,
      difficulty: 0.5,
      failure: 1.0,
      tag_weakness: 0.7,
    };
    let weights = WeightConfig::default();
    let (score, reason) = weigh(&features, &weights);

    let expected = 0.30 * 0.6
      + 0.20 * 0.5
      + 0.10 * 0.2
      + 0.05 * 0.5
      + 0.15 * 0.5
      + 0.10 * 1.0
      + 0.10 * 0.7;
    assert!((score - expected).abs() < 1e-12);

    let reason_sum: f64 = reason.iter().map(|c| c.value).sum();
    assert!((reason_sum - score).abs() < 1e-12);
  }

  #[test]
  fn test_reason_sorted_descending_with_stable_ties() {
    let features = Features {
      confidence: 0.5,
      recency: 0.5,
      attempts: 0.5,
      time: 0.5,
      difficulty: 0.5,
      failure: 0.5,
      tag_weakness: 0.5,
    };
    let weights = WeightConfig {
      confidence: 0.1,
      days: 0.3,
      attempts: 0.1,
      time: 0.3,
      difficulty: 0.0,
      failed: 0.1,
      tag: 0.1,
    };
    let (_, reason) = weigh(&features, &weights);
    let order: Vec<Factor> = reason.iter().map(|c| c.factor).collect();
    assert_eq!(
      order,
      vec![
        Factor::Recency,
        Factor::Time,
        Factor::Confidence,
        Factor::Attempts,
        Factor::Failure,
        Factor::TagWeakness,
        Factor::Difficulty,
      ]
    );
    for pair in reason.windows(2) {
      assert!(pair[0].value >= pair[1].value);
    }
  }

  #[test]
  fn test_zero_weights_give_zero_score() {
    let weights = WeightConfig {
      confidence: 0.0,
      days: 0.0,
      attempts: 0.0,
      time: 0.0,
      difficulty: 0.0,
      failed: 0.0,
      tag: 0.0,
    };
    let stat = ItemStat::new(1);
    let tuning = Tuning::default();
    let result = score_item(&stat, Difficulty::Hard, None, &weights, testing::now(), &tuning);
    assert_eq!(result.score, 0.0);
    assert_eq!(result.summary, "needs review");
  }

  #[test]
  fn test_apply_emphasis_renormalises() {
    let base = WeightConfig::default();
    for emphasis in [ScoringEmphasis::Confidence, ScoringEmphasis::Failure, ScoringEmphasis::Time] {
      let w = apply_emphasis(&base, emphasis);
      assert!((w.total() - 1.0).abs() < 1e-9, "{:?}", emphasis);
    }

    let w = apply_emphasis(&base, ScoringEmphasis::Confidence);
    // 0.6 / 1.3
    assert!((w.confidence - 0.6 / 1.3).abs() < 1e-12);
    assert!(w.confidence > base.confidence);

    let w = apply_emphasis(&base, ScoringEmphasis::Time);
    assert!((w.time - 0.15 / 1.1).abs() < 1e-12);
  }

  #[test]
  fn test_standard_emphasis_is_identity() {
    let base = WeightConfig {
      confidence: 0.7,
      ..WeightConfig::default()
    };
    assert_eq!(apply_emphasis(&base, ScoringEmphasis::Standard), base);
  }

  #[test]
  fn test_summary_mentions_top_contributors() {
    let now = testing::now();
    let mut stat = ItemStat::new(2);
    stat.confidence = 40;
    stat.total_attempts = 2;
    stat.last_outcome = Some(Outcome::Failed);
    stat.last_attempt_at = Some(now - Duration::days(20));

    let weights = WeightConfig::default();
    let tuning = Tuning::default();
    let result = score_item(&stat, Difficulty::Medium, Some(40.0), &weights, now, &tuning);
    assert_eq!(result.summary, "confidence 40%, 20 days since last, failed last attempt");
  }

  #[test]
  fn test_summary_reports_attempts_and_solve_time() {
    let e = testing::entry(3, Difficulty::Medium, 50).attempts(10).solve_seconds(3600);
    let weights = WeightConfig {
      confidence: 0.0,
      days: 0.0,
      attempts: 0.5,
      time: 0.5,
      difficulty: 0.0,
      failed: 0.0,
      tag: 0.0,
    };
    let tuning = Tuning::default();
    let result = score_item(&e.stat, Difficulty::Medium, None, &weights, testing::now(), &tuning);
    assert!((result.score - 1.0).abs() < 1e-12);
    assert_eq!(result.summary, "10 attempts, long solve time");
  }

  #[test]
  fn test_summary_reports_overdue_schedule() {
    let now = testing::now();
    let mut stat = ItemStat::new(2);
    stat.confidence = 100;
    stat.total_attempts = 1;
    stat.last_attempt_at = Some(now - Duration::days(9));
    stat.schedule.next_review_at = Some(now - Duration::days(4));
    let weights = WeightConfig {
      confidence: 0.0,
      days: 1.0,
      attempts: 0.0,
      time: 0.0,
      difficulty: 0.0,
      failed: 0.0,
      tag: 0.0,
    };
    let result = score_item(&stat, Difficulty::Easy, None, &weights, now, &Tuning::default());
    assert_eq!(result.summary, "4 days overdue");
  }

  #[test]
  fn test_compute_scores_skips_missing_reference_data() {
    let mut snapshot = testing::snapshot_with(&[
      testing::entry(1, Difficulty::Easy, 90).tags(&[10]),
      testing::entry(2, Difficulty::Hard, 20).tags(&[11]),
    ]);
    snapshot.item_stats.push(ItemStat::new(99));

    let weights = WeightConfig::default();
    let scores = compute_scores(&snapshot, &weights, testing::now(), &Tuning::default());
    let ids: Vec<i64> = scores.iter().map(|s| s.item_id).collect();
    assert_eq!(ids, vec![1, 2]);
  }

  #[test]
  fn test_compute_scores_is_deterministic() {
    let snapshot = testing::snapshot_with(&[
      testing::entry(1, Difficulty::Easy, 90).tags(&[10]),
      testing::entry(2, Difficulty::Medium, 50).tags(&[10, 11]),
      testing::entry(3, Difficulty::Hard, 10).tags(&[11]),
    ]);
    let a = compute_scores(&snapshot, &WeightConfig::default(), testing::now(), &Tuning::default());
    let b = compute_scores(&snapshot, &WeightConfig::default(), testing::now(), &Tuning::default());
    assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
  }
}
