//! Difficulty shaping: distribution re-sampling or easy-to-hard progression.

use crate::config::Tuning;
use crate::domain::Difficulty;
use crate::templates::{DifficultyDistribution, TemplateConfig};

use super::Candidate;

/// Reorder or re-sample `candidates` per the template's difficulty shaping.
/// Templates with neither mode return the input unchanged.
pub fn shape<'a>(
  candidates: Vec<&'a Candidate>,
  template: &TemplateConfig,
  tuning: &Tuning,
) -> Vec<&'a Candidate> {
  if let Some(dist) = &template.difficulty_distribution {
    distribute(candidates, dist, tuning)
  } else if template.progression_mode {
    progression(candidates)
  } else {
    candidates
  }
}

fn bucket<'a>(candidates: &[&'a Candidate], difficulty: Difficulty) -> Vec<&'a Candidate> {
  candidates
    .iter()
    .copied()
    .filter(|c| c.difficulty() == difficulty)
    .collect()
}

/// Pick per-bucket quotas from the percentages, over at most
/// `distribution_pool_cap` candidates. Score order is kept within buckets.
pub fn distribute<'a>(
  candidates: Vec<&'a Candidate>,
  dist: &DifficultyDistribution,
  tuning: &Tuning,
) -> Vec<&'a Candidate> {
  let total = candidates.len();
  if total <= tuning.small_pool_threshold {
    return candidates;
  }
  let pool_size = tuning.distribution_pool_cap.min(total);

  let mut shaped = Vec::with_capacity(pool_size);
  for difficulty in Difficulty::ALL {
    let items = bucket(&candidates, difficulty);
    let pct = dist.pct_for(difficulty);
    let mut target = (pct / 100.0 * pool_size as f64).round() as usize;
    if pct > 0.0 && target == 0 {
      target = 1;
    }
    let take = target.min(items.len());
    tracing::debug!(
      "Distribution {}: {}% of {} -> {} (available {})",
      difficulty.as_str(),
      pct,
      pool_size,
      take,
      items.len()
    );
    shaped.extend(items.into_iter().take(take));
  }
  shaped
}

/// Easy, then medium, then hard; order within a bucket is not significant.
pub fn progression(candidates: Vec<&Candidate>) -> Vec<&Candidate> {
  Difficulty::ALL
    .iter()
    .flat_map(|&d| bucket(&candidates, d))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing;

  fn ids(selected: &[&Candidate]) -> Vec<i64> {
    selected.iter().map(|c| c.id()).collect()
  }

  fn mixed_pool() -> Vec<Candidate> {
    // Descending scores, interleaved difficulties
    let difficulties = [
      Difficulty::Hard,
      Difficulty::Medium,
      Difficulty::Easy,
      Difficulty::Hard,
      Difficulty::Medium,
      Difficulty::Medium,
      Difficulty::Easy,
      Difficulty::Hard,
      Difficulty::Medium,
      Difficulty::Medium,
    ];
    difficulties
      .iter()
      .enumerate()
      .map(|(i, &d)| testing::candidate(i as i64 + 1, d, 1.0 - i as f64 * 0.05, &[1]))
      .collect()
  }

  #[test]
  fn test_distribution_quotas() {
    let pool = mixed_pool();
    let dist = DifficultyDistribution::new(20.0, 50.0, 30.0);
    let out = distribute(pool.iter().collect(), &dist, &Tuning::default());
    // 10 candidates: easy 2, medium 5, hard 3
    assert_eq!(ids(&out), vec![3, 7, 2, 5, 6, 9, 10, 1, 4, 8]);
  }

  #[test]
  fn test_distribution_guarantees_one_per_nonzero_bucket() {
    let pool = mixed_pool();
    let dist = DifficultyDistribution::new(1.0, 90.0, 0.0);
    let out = distribute(pool.iter().collect(), &dist, &Tuning::default());
    let easy = out.iter().filter(|c| c.difficulty() == Difficulty::Easy).count();
    let hard = out.iter().filter(|c| c.difficulty() == Difficulty::Hard).count();
    assert_eq!(easy, 1);
    assert_eq!(hard, 0);
    assert_eq!(out[0].id(), 3);
  }

  #[test]
  fn test_distribution_keeps_score_order_within_bucket() {
    let pool = mixed_pool();
    let dist = DifficultyDistribution::new(0.0, 30.0, 0.0);
    let out = distribute(pool.iter().collect(), &dist, &Tuning::default());
    assert_eq!(ids(&out), vec![2, 5, 6]);
  }

  #[test]
  fn test_small_pool_skips_distribution() {
    let pool: Vec<Candidate> = mixed_pool().into_iter().take(5).collect();
    let dist = DifficultyDistribution::new(100.0, 0.0, 0.0);
    let out = distribute(pool.iter().collect(), &dist, &Tuning::default());
    assert_eq!(ids(&out), vec![1, 2, 3, 4, 5]);
  }

  #[test]
  fn test_distribution_pool_is_capped() {
    let pool = mixed_pool();
    let tuning = Tuning {
      distribution_pool_cap: 6,
      ..Tuning::default()
    };
    let dist = DifficultyDistribution::new(0.0, 100.0, 0.0);
    let out = distribute(pool.iter().collect(), &dist, &tuning);
    assert_eq!(ids(&out), vec![2, 5, 6, 9, 10]);
  }

  #[test]
  fn test_progression_orders_easy_to_hard() {
    let pool = mixed_pool();
    let out = progression(pool.iter().collect());
    let diffs: Vec<Difficulty> = out.iter().map(|c| c.difficulty()).collect();
    let mut sorted = diffs.clone();
    sorted.sort();
    assert_eq!(diffs, sorted);
    assert_eq!(out.len(), pool.len());
  }

  #[test]
  fn test_shape_without_mode_is_identity() {
    let pool = mixed_pool();
    let template = TemplateConfig::new("t", 60);
    let out = shape(pool.iter().collect(), &template, &Tuning::default());
    assert_eq!(ids(&out), (1..=10).collect::<Vec<i64>>());
  }
}
