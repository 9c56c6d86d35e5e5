//! Tag-mode narrowing of the candidate set.

use std::collections::HashSet;
use std::fmt;

use crate::domain::TagStat;
use crate::templates::{TagMode, TemplateConfig};

use super::Candidate;

#[derive(Debug, Clone, PartialEq)]
pub enum TagModeError {
  /// `specific` mode without a configured tag id
  MissingTagId,
}

impl fmt::Display for TagModeError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TagModeError::MissingTagId => write!(f, "Tag mode 'specific' requires a tag id"),
    }
  }
}

impl std::error::Error for TagModeError {}

/// The `count` tags with the lowest average confidence.
///
/// Ties keep the order of `tag_stats`.
pub fn weakest_tags(tag_stats: &[TagStat], count: usize) -> Vec<i64> {
  let mut ranked: Vec<&TagStat> = tag_stats.iter().collect();
  ranked.sort_by(|a, b| a.avg_confidence.total_cmp(&b.avg_confidence));
  ranked.into_iter().take(count).map(|ts| ts.tag_id).collect()
}

/// Keep the candidates matching the template's tag mode.
pub fn select<'a>(
  candidates: Vec<&'a Candidate>,
  template: &TemplateConfig,
  tag_stats: &[TagStat],
) -> Result<Vec<&'a Candidate>, TagModeError> {
  let selected = match template.tag_mode {
    TagMode::All => candidates,
    TagMode::Specific => {
      let tag_id = template.tag_id.ok_or(TagModeError::MissingTagId)?;
      candidates.into_iter().filter(|c| c.has_tag(tag_id)).collect()
    }
    TagMode::Weakest => {
      let weakest: HashSet<i64> = weakest_tags(tag_stats, template.tag_count).into_iter().collect();
      tracing::debug!("Weakest {} tags: {:?}", template.tag_count, weakest);
      candidates
        .into_iter()
        .filter(|c| c.tags.iter().any(|t| weakest.contains(t)))
        .collect()
    }
    TagMode::MultiTag => candidates.into_iter().filter(|c| c.tags.len() >= 2).collect(),
  };
  Ok(selected)
}
