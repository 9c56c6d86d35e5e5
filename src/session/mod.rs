//! Session generation.
//!
//! Candidates are filtered, tag-narrowed, shaped and allocated once per
//! relaxation level, strictest first, until a level produces an acceptable
//! selection. If none does, the single highest-scored candidate under the
//! difficulty ceiling is forced, or the overall top one if none is under it.

pub mod allocator;
pub mod candidates;
pub mod filters;
pub mod shaping;
pub mod tag_mode;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Tuning;
use crate::domain::UserSnapshot;
use crate::error::PlannerError;
use crate::scoring::ScoreResult;
use crate::templates::TemplateConfig;

pub use allocator::{allocate, force_top, Allocation, AllocationLimits};
pub use candidates::{build_candidates, Candidate, CandidatePool};
pub use filters::{apply_level, FilterStep, RelaxationLevel};

/// Which stage of the ladder produced a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
  Relaxation(RelaxationLevel),
  /// Highest-scored candidate forced after every level came up empty
  Fallback,
}

/// Ordered session plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSelection {
  pub user_id: i64,
  pub template_key: String,
  pub planned_duration: u32,
  pub items: Vec<Candidate>,
  pub total_minutes: u32,
  pub quick_wins: u32,
  pub source: SelectionSource,
  /// Items dropped for missing reference, statistic or tag data
  pub skipped_items: usize,
}

impl SessionSelection {
  /// Item ids in session order, as stored by the persistence layer.
  pub fn item_ids(&self) -> Vec<i64> {
    self.items.iter().map(|c| c.id()).collect()
  }

  pub fn distinct_tags(&self) -> usize {
    let mut tags: Vec<i64> = self.items.iter().flat_map(|c| c.tags.iter().copied()).collect();
    tags.sort_unstable();
    tags.dedup();
    tags.len()
  }
}

/// Run one relaxation level; None if it yields nothing acceptable.
fn try_level<'a>(
  pool: &'a [Candidate],
  level: RelaxationLevel,
  template: &TemplateConfig,
  snapshot: &UserSnapshot,
  tuning: &Tuning,
) -> Option<Allocation<'a>> {
  let filtered = apply_level(pool, level, template, &snapshot.tag_stats);
  if filtered.is_empty() {
    tracing::debug!("Level {} ({:?}): no candidates after filtering", level.index(), level);
    return None;
  }

  let shaped = if level.shapes_difficulty() {
    shaping::shape(filtered, template, tuning)
  } else {
    filtered
  };

  let limits = AllocationLimits::from_template(template, level.caps_tags());
  let allocation = allocate(&shaped, &limits);
  if allocation.is_empty() {
    tracing::debug!(
      "Level {} ({:?}): nothing fits in {} minutes",
      level.index(),
      level,
      template.duration_minutes
    );
    return None;
  }

  if level.requires_quick_wins() {
    if let Some(required) = template.min_quick_wins {
      if allocation.quick_wins < required {
        tracing::debug!(
          "Level {} ({:?}): {} of {} quick wins",
          level.index(),
          level,
          allocation.quick_wins,
          required
        );
        return None;
      }
    }
  }

  Some(allocation)
}

/// Generate a session for one user.
///
/// Fails when the snapshot carries out-of-range confidences or yields no
/// candidates at all.
pub fn generate_session(
  snapshot: &UserSnapshot,
  scores: &[ScoreResult],
  template: &TemplateConfig,
  now: DateTime<Utc>,
  tuning: &Tuning,
) -> Result<SessionSelection, PlannerError> {
  snapshot.validate()?;
  let pool = build_candidates(snapshot, scores, now, tuning);
  if pool.candidates.is_empty() {
    return Err(PlannerError::NoCandidates {
      user_id: snapshot.user_id,
    });
  }

  let mut chosen = None;
  for level in RelaxationLevel::ALL {
    if let Some(allocation) = try_level(&pool.candidates, level, template, snapshot, tuning) {
      chosen = Some((allocation, SelectionSource::Relaxation(level)));
      break;
    }
  }

  let (allocation, source) = match chosen {
    Some(found) => found,
    None => {
      tracing::warn!(
        "Template '{}' unsatisfiable for user {} at every level; forcing top candidate",
        template.key,
        snapshot.user_id
      );
      // The ceiling holds unless no candidate is under it
      let mut eligible = apply_level(
        &pool.candidates,
        RelaxationLevel::CeilingOnly,
        template,
        &snapshot.tag_stats,
      );
      if eligible.is_empty() {
        eligible = pool.candidates.iter().collect();
      }
      (force_top(&eligible), SelectionSource::Fallback)
    }
  };

  let selection = SessionSelection {
    user_id: snapshot.user_id,
    template_key: template.key.clone(),
    planned_duration: template.duration_minutes,
    items: allocation.selected.into_iter().cloned().collect(),
    total_minutes: allocation.total_minutes,
    quick_wins: allocation.quick_wins,
    source,
    skipped_items: pool.skipped,
  };

  tracing::info!(
    "Generated '{}' session for user {}: {} items, {}/{} min, {} quick wins ({:?})",
    selection.template_key,
    selection.user_id,
    selection.items.len(),
    selection.total_minutes,
    selection.planned_duration,
    selection.quick_wins,
    selection.source
  );
  Ok(selection)
}
