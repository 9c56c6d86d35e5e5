//! Session templates: named bundles of session constraints.
//!
//! Presets cover daily revision, tag mastery and long weekend sessions.
//! Custom templates are deserialised from TOML and validated on load.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::domain::Difficulty;
use crate::error::TemplateError;
use crate::scoring::ScoringEmphasis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
  Daily,
  Pattern,
  Weekend,
  #[default]
  Custom,
}

/// Strategy for narrowing candidates to a thematic subset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagMode {
  #[default]
  All,
  /// Only items carrying `tag_id`
  Specific,
  /// Only items carrying one of the `tag_count` weakest tags
  Weakest,
  /// Only items carrying two or more tags
  MultiTag,
}

impl TagMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::All => "all",
      Self::Specific => "specific",
      Self::Weakest => "weakest",
      Self::MultiTag => "multi_tag",
    }
  }
}

/// Target share of each difficulty, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyDistribution {
  pub easy_pct: f64,
  pub medium_pct: f64,
  pub hard_pct: f64,
}

impl DifficultyDistribution {
  pub fn new(easy_pct: f64, medium_pct: f64, hard_pct: f64) -> Self {
    Self {
      easy_pct,
      medium_pct,
      hard_pct,
    }
  }

  pub fn pct_for(&self, difficulty: Difficulty) -> f64 {
    match difficulty {
      Difficulty::Easy => self.easy_pct,
      Difficulty::Medium => self.medium_pct,
      Difficulty::Hard => self.hard_pct,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
  pub key: String,
  #[serde(default)]
  pub display_name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub category: TemplateCategory,
  pub duration_minutes: u32,

  // Selection constraints
  #[serde(default = "default_max_difficulty")]
  pub max_difficulty: Difficulty,
  #[serde(default)]
  pub min_quick_wins: Option<u32>,
  #[serde(default = "default_max_same_tag")]
  pub max_same_tag: u32,
  #[serde(default)]
  pub min_confidence: Option<u8>,
  #[serde(default)]
  pub max_confidence: Option<u8>,
  #[serde(default)]
  pub min_days_since_last: Option<u32>,
  #[serde(default)]
  pub min_items: Option<u32>,
  #[serde(default)]
  pub min_distinct_tags: Option<u32>,

  // Tag focus
  #[serde(default)]
  pub tag_mode: TagMode,
  #[serde(default = "default_tag_count")]
  pub tag_count: usize,
  #[serde(default)]
  pub tag_id: Option<i64>,

  // Difficulty shaping (at most one)
  #[serde(default)]
  pub difficulty_distribution: Option<DifficultyDistribution>,
  #[serde(default)]
  pub progression_mode: bool,

  #[serde(default)]
  pub emphasis: ScoringEmphasis,
}

fn default_max_difficulty() -> Difficulty {
  Difficulty::Hard
}

fn default_max_same_tag() -> u32 {
  2
}

fn default_tag_count() -> usize {
  1
}

impl TemplateConfig {
  /// Unconstrained template with the given key and duration.
  pub fn new(key: impl Into<String>, duration_minutes: u32) -> Self {
    Self {
      key: key.into(),
      display_name: String::new(),
      description: String::new(),
      category: TemplateCategory::Custom,
      duration_minutes,
      max_difficulty: default_max_difficulty(),
      min_quick_wins: None,
      max_same_tag: default_max_same_tag(),
      min_confidence: None,
      max_confidence: None,
      min_days_since_last: None,
      min_items: None,
      min_distinct_tags: None,
      tag_mode: TagMode::All,
      tag_count: default_tag_count(),
      tag_id: None,
      difficulty_distribution: None,
      progression_mode: false,
      emphasis: ScoringEmphasis::Standard,
    }
  }

  pub fn with_duration(mut self, minutes: u32) -> Self {
    self.duration_minutes = minutes;
    self
  }

  /// Bind the tag used by `TagMode::Specific`.
  pub fn with_tag(mut self, tag_id: i64) -> Self {
    self.tag_id = Some(tag_id);
    self
  }

  pub fn allows_difficulty(&self, difficulty: Difficulty) -> bool {
    difficulty <= self.max_difficulty
  }

  /// Reject contradictory or out-of-range constraints.
  ///
  /// A `specific` template without a tag id is accepted here: the engine
  /// treats it as an empty tag filter and relaxes past it.
  pub fn validate(&self) -> Result<(), TemplateError> {
    let invalid = |reason: &str| Err(TemplateError::Invalid(self.key.clone(), reason.to_string()));

    if self.duration_minutes == 0 {
      return invalid("duration_minutes must be at least 1");
    }
    if self.max_same_tag == 0 {
      return invalid("max_same_tag must be at least 1");
    }
    for bound in [self.min_confidence, self.max_confidence].into_iter().flatten() {
      if bound > 100 {
        return invalid("confidence bounds must be within 0-100");
      }
    }
    if let (Some(min), Some(max)) = (self.min_confidence, self.max_confidence) {
      if min > max {
        return invalid("min_confidence exceeds max_confidence");
      }
    }
    if self.tag_mode == TagMode::Weakest && self.tag_count == 0 {
      return invalid("weakest tag mode needs tag_count of at least 1");
    }
    if let Some(dist) = &self.difficulty_distribution {
      if self.progression_mode {
        return invalid("difficulty_distribution and progression_mode are mutually exclusive");
      }
      let pcts = [dist.easy_pct, dist.medium_pct, dist.hard_pct];
      if pcts.iter().any(|p| !p.is_finite() || *p < 0.0 || *p > 100.0) {
        return invalid("difficulty percentages must be within 0-100");
      }
      if pcts.iter().sum::<f64>() <= 0.0 {
        return invalid("difficulty percentages must not all be zero");
      }
    }
    Ok(())
  }

  /// Parse and validate a custom template from TOML.
  pub fn from_toml_str(contents: &str) -> Result<Self, TemplateError> {
    let template: TemplateConfig =
      toml::from_str(contents).map_err(|e| TemplateError::ParseError(e.to_string()))?;
    template.validate()?;
    Ok(template)
  }
}

// ==================== Presets ====================

static PRESETS: LazyLock<Vec<TemplateConfig>> = LazyLock::new(build_presets);

/// All preset templates, in catalogue order
pub fn presets() -> &'static [TemplateConfig] {
  &PRESETS
}

pub fn preset(key: &str) -> Option<&'static TemplateConfig> {
  PRESETS.iter().find(|t| t.key == key)
}

/// Look up a preset by key, returning an owned copy the caller may adjust.
pub fn resolve(key: &str) -> Result<TemplateConfig, TemplateError> {
  preset(key)
    .cloned()
    .ok_or_else(|| TemplateError::UnknownTemplate(key.to_string()))
}

fn preset_base(
  key: &str,
  display_name: &str,
  description: &str,
  category: TemplateCategory,
  duration_minutes: u32,
) -> TemplateConfig {
  TemplateConfig {
    display_name: display_name.to_string(),
    description: description.to_string(),
    category,
    ..TemplateConfig::new(key, duration_minutes)
  }
}

fn build_presets() -> Vec<TemplateConfig> {
  use TemplateCategory::{Daily, Pattern, Weekend};

  vec![
    TemplateConfig {
      max_difficulty: Difficulty::Medium,
      min_quick_wins: Some(2),
      max_same_tag: 2,
      ..preset_base(
        "daily_revision",
        "Daily Revision",
        "Short daily review with quick wins up front.",
        Daily,
        35,
      )
    },
    TemplateConfig {
      max_difficulty: Difficulty::Medium,
      min_quick_wins: Some(2),
      max_same_tag: 2,
      min_items: Some(3),
      min_distinct_tags: Some(2),
      min_confidence: Some(70),
      min_days_since_last: Some(7),
      ..preset_base(
        "morning_momentum",
        "Morning Momentum Builder",
        "Start the day with confident wins on items you know well.",
        Daily,
        35,
      )
    },
    TemplateConfig {
      max_difficulty: Difficulty::Medium,
      min_quick_wins: Some(1),
      max_same_tag: 3,
      min_items: Some(2),
      min_distinct_tags: Some(1),
      tag_mode: TagMode::Weakest,
      tag_count: 2,
      emphasis: ScoringEmphasis::Confidence,
      max_confidence: Some(65),
      ..preset_base(
        "weakness_crusher",
        "Weakness Crusher",
        "Target low-confidence items from your weakest tags.",
        Daily,
        45,
      )
    },
    TemplateConfig {
      difficulty_distribution: Some(DifficultyDistribution::new(10.0, 60.0, 30.0)),
      min_quick_wins: Some(1),
      max_same_tag: 2,
      min_items: Some(3),
      min_distinct_tags: Some(2),
      ..preset_base(
        "daily_mixed_grind",
        "Daily Mixed Grind",
        "Standard daily practice with an easy/medium/hard mix.",
        Daily,
        55,
      )
    },
    TemplateConfig {
      max_same_tag: 6,
      min_items: Some(4),
      min_distinct_tags: Some(1),
      tag_mode: TagMode::Specific,
      emphasis: ScoringEmphasis::Confidence,
      progression_mode: true,
      ..preset_base(
        "pattern_deep_dive",
        "Pattern Deep Dive",
        "Work one tag intensively with easy to hard progression.",
        Pattern,
        90,
      )
    },
    TemplateConfig {
      max_difficulty: Difficulty::Medium,
      min_quick_wins: Some(0),
      max_same_tag: 1,
      min_items: Some(3),
      min_distinct_tags: Some(3),
      tag_mode: TagMode::Weakest,
      tag_count: 3,
      min_days_since_last: Some(5),
      ..preset_base(
        "pattern_rotation",
        "Pattern Rotation",
        "One item from each of your three weakest tags.",
        Pattern,
        60,
      )
    },
    TemplateConfig {
      max_same_tag: 2,
      min_items: Some(3),
      min_distinct_tags: Some(2),
      tag_mode: TagMode::MultiTag,
      ..preset_base(
        "pattern_combo_chains",
        "Pattern Combo Chains",
        "Items that combine two or more tags.",
        Pattern,
        75,
      )
    },
    TemplateConfig {
      difficulty_distribution: Some(DifficultyDistribution::new(0.0, 33.0, 67.0)),
      max_same_tag: 3,
      min_items: Some(3),
      min_distinct_tags: Some(1),
      tag_mode: TagMode::Specific,
      min_days_since_last: Some(14),
      ..preset_base(
        "pattern_graduation",
        "Pattern Mastery Graduation",
        "Rested medium and hard items from one tag to prove mastery.",
        Pattern,
        50,
      )
    },
    TemplateConfig {
      difficulty_distribution: Some(DifficultyDistribution::new(15.0, 55.0, 30.0)),
      min_quick_wins: Some(2),
      max_same_tag: 3,
      min_items: Some(6),
      min_distinct_tags: Some(5),
      ..preset_base(
        "weekend_comprehensive",
        "Weekend Comprehensive",
        "Long session across all difficulties and many tags.",
        Weekend,
        150,
      )
    },
    TemplateConfig {
      difficulty_distribution: Some(DifficultyDistribution::new(40.0, 50.0, 10.0)),
      min_quick_wins: Some(2),
      max_same_tag: 3,
      min_items: Some(5),
      min_distinct_tags: Some(2),
      tag_mode: TagMode::Weakest,
      tag_count: 2,
      emphasis: ScoringEmphasis::Confidence,
      ..preset_base(
        "weak_pattern_marathon",
        "Weak Pattern Marathon",
        "Confidence-building marathon on your two weakest tags.",
        Weekend,
        120,
      )
    },
    TemplateConfig {
      difficulty_distribution: Some(DifficultyDistribution::new(0.0, 50.0, 50.0)),
      max_same_tag: 2,
      min_items: Some(3),
      min_distinct_tags: Some(2),
      min_confidence: Some(60),
      ..preset_base(
        "challenge_gauntlet",
        "Challenge Gauntlet",
        "Medium and hard items under interview-style time pressure.",
        Weekend,
        100,
      )
    },
  ]
}
