//! Template constraint filters and the relaxation ladder.
//!
//! Each level is an ordered list of [`FilterStep`]s. Relaxing a level drops
//! steps from the list; the difficulty ceiling is present at every level.

use serde::{Deserialize, Serialize};

use crate::domain::TagStat;
use crate::templates::TemplateConfig;

use super::{tag_mode, Candidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxationLevel {
  /// Full constraints
  Strict,
  /// Confidence range dropped
  NoConfidence,
  /// Minimum days since last attempt dropped
  NoRecency,
  /// Tag mode dropped
  NoTagMode,
  /// Difficulty ceiling only; shaping and the per-tag cap are dropped too
  CeilingOnly,
}

impl RelaxationLevel {
  pub const ALL: [RelaxationLevel; 5] = [
    RelaxationLevel::Strict,
    RelaxationLevel::NoConfidence,
    RelaxationLevel::NoRecency,
    RelaxationLevel::NoTagMode,
    RelaxationLevel::CeilingOnly,
  ];

  pub fn index(&self) -> u8 {
    match self {
      Self::Strict => 0,
      Self::NoConfidence => 1,
      Self::NoRecency => 2,
      Self::NoTagMode => 3,
      Self::CeilingOnly => 4,
    }
  }

  /// Filter steps applied at this level, in order.
  pub fn steps(&self) -> &'static [FilterStep] {
    use FilterStep::*;
    match self {
      Self::Strict => &[DifficultyCeiling, ConfidenceRange, MinDaysSinceLast, TagMode],
      Self::NoConfidence => &[DifficultyCeiling, MinDaysSinceLast, TagMode],
      Self::NoRecency => &[DifficultyCeiling, TagMode],
      Self::NoTagMode | Self::CeilingOnly => &[DifficultyCeiling],
    }
  }

  /// Whether a result must meet the template's quick-win minimum to be accepted.
  pub fn requires_quick_wins(&self) -> bool {
    matches!(self, Self::Strict | Self::NoConfidence)
  }

  /// Whether difficulty shaping still applies.
  pub fn shapes_difficulty(&self) -> bool {
    *self != Self::CeilingOnly
  }

  /// Whether the per-tag cap still applies.
  pub fn caps_tags(&self) -> bool {
    *self != Self::CeilingOnly
  }
}

/// One pure narrowing step over the candidate list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStep {
  DifficultyCeiling,
  ConfidenceRange,
  MinDaysSinceLast,
  TagMode,
}

impl FilterStep {
  pub fn apply<'a>(
    &self,
    candidates: Vec<&'a Candidate>,
    template: &TemplateConfig,
    tag_stats: &[TagStat],
  ) -> Vec<&'a Candidate> {
    match self {
      FilterStep::DifficultyCeiling => candidates
        .into_iter()
        .filter(|c| template.allows_difficulty(c.difficulty()))
        .collect(),
      FilterStep::ConfidenceRange => {
        let min = template.min_confidence.unwrap_or(0);
        let max = template.max_confidence.unwrap_or(100);
        candidates
          .into_iter()
          .filter(|c| (min..=max).contains(&c.stat.confidence))
          .collect()
      }
      FilterStep::MinDaysSinceLast => match template.min_days_since_last {
        None => candidates,
        Some(min_days) => candidates
          .into_iter()
          .filter(|c| c.days_since_last.is_none_or(|d| d >= min_days))
          .collect(),
      },
      FilterStep::TagMode => match tag_mode::select(candidates, template, tag_stats) {
        Ok(selected) => selected,
        Err(e) => {
          tracing::warn!("Template '{}': {}; treating as no candidates", template.key, e);
          Vec::new()
        }
      },
    }
  }
}

/// Apply every step of `level` in order.
pub fn apply_level<'a>(
  candidates: &'a [Candidate],
  level: RelaxationLevel,
  template: &TemplateConfig,
  tag_stats: &[TagStat],
) -> Vec<&'a Candidate> {
  let all: Vec<&Candidate> = candidates.iter().collect();
  level
    .steps()
    .iter()
    .fold(all, |remaining, step| step.apply(remaining, template, tag_stats))
}
