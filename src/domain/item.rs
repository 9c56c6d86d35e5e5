use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  /// Bucket order used by shaping and progression.
  pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

  pub fn from_str(s: &str) -> Option<Self> {
    match s.to_ascii_lowercase().as_str() {
      "easy" => Some(Self::Easy),
      "medium" => Some(Self::Medium),
      "hard" => Some(Self::Hard),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Easy => "easy",
      Self::Medium => "medium",
      Self::Hard => "hard",
    }
  }

  /// Difficulty boost feature value.
  pub fn boost(&self) -> f64 {
    match self {
      Self::Easy => 0.2,
      Self::Medium => 0.5,
      Self::Hard => 1.0,
    }
  }
}

/// Result of a single practice attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
  Passed,
  Failed,
}

impl Outcome {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "passed" => Some(Self::Passed),
      "failed" => Some(Self::Failed),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Passed => "passed",
      Self::Failed => "failed",
    }
  }

  pub fn is_failure(&self) -> bool {
    matches!(self, Self::Failed)
  }
}

/// Reference data for a practice item. Never mutated by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
  pub id: i64,
  pub title: String,
  pub difficulty: Difficulty,
  #[serde(default)]
  pub source: Option<String>,
  #[serde(default)]
  pub url: Option<String>,
}

impl Item {
  pub fn new(id: i64, title: impl Into<String>, difficulty: Difficulty) -> Self {
    Self {
      id,
      title: title.into(),
      difficulty,
      source: None,
      url: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_difficulty_roundtrip() {
    for d in Difficulty::ALL {
      assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
    }
    assert_eq!(Difficulty::from_str("Hard"), Some(Difficulty::Hard));
    assert_eq!(Difficulty::from_str("extreme"), None);
  }

  #[test]
  fn test_difficulty_ordering() {
    assert!(Difficulty::Easy < Difficulty::Medium);
    assert!(Difficulty::Medium < Difficulty::Hard);
  }

  #[test]
  fn test_difficulty_boost_values() {
    assert_eq!(Difficulty::Easy.boost(), 0.2);
    assert_eq!(Difficulty::Medium.boost(), 0.5);
    assert_eq!(Difficulty::Hard.boost(), 1.0);
  }

  #[test]
  fn test_outcome_serde_names() {
    let json = serde_json::to_string(&Outcome::Failed).unwrap();
    assert_eq!(json, "\"failed\"");
    assert_eq!(Outcome::from_str("passed"), Some(Outcome::Passed));
    assert!(Outcome::Failed.is_failure());
  }
}
