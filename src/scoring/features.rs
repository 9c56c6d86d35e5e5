//! Normalisation of raw item statistics into seven [0, 1] urgency features.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Tuning;
use crate::domain::{Difficulty, ItemStat, TagStat};

/// Tag weakness used when none of an item's tags has statistics yet
const UNKNOWN_TAG_WEAKNESS: f64 = 0.5;

/// The seven urgency factors, in weight order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
  Confidence,
  Recency,
  Attempts,
  Time,
  Difficulty,
  Failure,
  TagWeakness,
}

impl Factor {
  pub const ALL: [Factor; 7] = [
    Factor::Confidence,
    Factor::Recency,
    Factor::Attempts,
    Factor::Time,
    Factor::Difficulty,
    Factor::Failure,
    Factor::TagWeakness,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Confidence => "confidence",
      Self::Recency => "recency",
      Self::Attempts => "attempts",
      Self::Time => "time",
      Self::Difficulty => "difficulty",
      Self::Failure => "failure",
      Self::TagWeakness => "tag_weakness",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Features {
  pub confidence: f64,
  pub recency: f64,
  pub attempts: f64,
  pub time: f64,
  pub difficulty: f64,
  pub failure: f64,
  pub tag_weakness: f64,
}

impl Features {
  /// Feature values paired with their factor, in `Factor::ALL` order.
  pub fn pairs(&self) -> [(Factor, f64); 7] {
    [
      (Factor::Confidence, self.confidence),
      (Factor::Recency, self.recency),
      (Factor::Attempts, self.attempts),
      (Factor::Time, self.time),
      (Factor::Difficulty, self.difficulty),
      (Factor::Failure, self.failure),
      (Factor::TagWeakness, self.tag_weakness),
    ]
  }
}

fn unit(value: f64) -> f64 {
  if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

fn capped_ratio(value: f64, cap: f64) -> f64 {
  unit(value.min(cap) / cap)
}

/// Compute normalised features for one item.
///
/// `weakest_tag_confidence` is the lowest average confidence among the item's
/// tags that have statistics, or None when no linked tag has any.
pub fn normalize(
  stat: &ItemStat,
  difficulty: Difficulty,
  weakest_tag_confidence: Option<f64>,
  now: DateTime<Utc>,
  tuning: &Tuning,
) -> Features {
  let recency = match stat.days_since_last(now) {
    Some(days) => capped_ratio(days, tuning.recency_cap_days as f64),
    // Never attempted: maximally urgent
    None => 1.0,
  };

  let failure = match stat.last_outcome {
    Some(outcome) if outcome.is_failure() => 1.0,
    _ => 0.0,
  };

  let tag_weakness = match weakest_tag_confidence {
    Some(conf) => unit(1.0 - conf / 100.0),
    None => UNKNOWN_TAG_WEAKNESS,
  };

  Features {
    confidence: unit((100.0 - stat.confidence as f64) / 100.0),
    recency,
    attempts: capped_ratio(stat.total_attempts as f64, tuning.attempt_cap as f64),
    time: capped_ratio(stat.avg_solve_seconds as f64, tuning.time_cap_seconds as f64),
    difficulty: difficulty.boost(),
    failure,
    tag_weakness,
  }
}

/// Lowest average confidence among `tags` that have a TagStat.
pub fn weakest_tag_confidence(tags: &[i64], tag_stats: &HashMap<i64, &TagStat>) -> Option<f64> {
  tags
    .iter()
    .filter_map(|tag| tag_stats.get(tag))
    .map(|ts| ts.avg_confidence)
    .min_by(|a, b| a.total_cmp(b))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Outcome;
  use chrono::{Duration, TimeZone};

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 20, 8, 0, 0).unwrap()
  }

  fn all_in_unit(f: &Features) -> bool {
    f.pairs().iter().all(|(_, v)| (0.0..=1.0).contains(v))
  }

  #[test]
  fn test_never_attempted_item_is_maximally_recent() {
    let stat = ItemStat::new(1);
    let f = normalize(&stat, Difficulty::Hard, None, now(), &Tuning::default());
    assert_eq!(f.recency, 1.0);
    assert_eq!(f.attempts, 0.0);
    assert_eq!(f.failure, 0.0);
    assert_eq!(f.difficulty, 1.0);
    assert_eq!(f.tag_weakness, 0.5);
  }

  #[test]
  fn test_formulas() {
    let mut stat = ItemStat::new(1);
    stat.confidence = 40;
    stat.total_attempts = 2;
    stat.avg_solve_seconds = 1800;
    stat.last_outcome = Some(Outcome::Failed);
    stat.last_attempt_at = Some(now() - Duration::days(15));

    let f = normalize(&stat, Difficulty::Medium, Some(30.0), now(), &Tuning::default());
    assert!((f.confidence - 0.6).abs() < 1e-12);
    assert!((f.recency - 0.5).abs() < 1e-12);
    assert!((f.attempts - 0.2).abs() < 1e-12);
    assert!((f.time - 0.5).abs() < 1e-12);
    assert_eq!(f.difficulty, 0.5);
    assert_eq!(f.failure, 1.0);
    assert!((f.tag_weakness - 0.7).abs() < 1e-12);
  }

  #[test]
  fn test_caps_saturate() {
    let mut stat = ItemStat::new(1);
    stat.confidence = 0;
    stat.total_attempts = 250;
    stat.avg_solve_seconds = 20_000;
    stat.last_attempt_at = Some(now() - Duration::days(400));

    let f = normalize(&stat, Difficulty::Easy, Some(0.0), now(), &Tuning::default());
    assert_eq!(f.confidence, 1.0);
    assert_eq!(f.recency, 1.0);
    assert_eq!(f.attempts, 1.0);
    assert_eq!(f.time, 1.0);
    assert_eq!(f.tag_weakness, 1.0);
  }

  #[test]
  fn test_out_of_range_inputs_stay_in_unit_interval() {
    let mut stat = ItemStat::new(1);
    stat.confidence = 255;
    stat.last_attempt_at = Some(now() + Duration::days(3));
    let f = normalize(&stat, Difficulty::Easy, Some(180.0), now(), &Tuning::default());
    assert!(all_in_unit(&f));
    assert_eq!(f.confidence, 0.0);
    assert_eq!(f.tag_weakness, 0.0);

    let f = normalize(&stat, Difficulty::Easy, Some(f64::NAN), now(), &Tuning::default());
    assert!(all_in_unit(&f));
  }

  #[test]
  fn test_weakest_tag_picks_minimum() {
    let a = TagStat { tag_id: 1, avg_confidence: 70.0, times_revised: 3 };
    let b = TagStat { tag_id: 2, avg_confidence: 35.0, times_revised: 1 };
    let map: HashMap<i64, &TagStat> = [(1, &a), (2, &b)].into_iter().collect();

    assert_eq!(weakest_tag_confidence(&[1, 2, 3], &map), Some(35.0));
    assert_eq!(weakest_tag_confidence(&[1], &map), Some(70.0));
    assert_eq!(weakest_tag_confidence(&[3], &map), None);
    assert_eq!(weakest_tag_confidence(&[], &map), None);
  }
}
