use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::{Item, ItemStat, TagStat};
use crate::error::PlannerError;

/// Read-only view of everything the planner needs for one user.
///
/// Loaded by the caller before invoking the engine; the engine never
/// performs I/O of its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSnapshot {
  pub user_id: i64,
  #[serde(default)]
  pub items: Vec<Item>,
  #[serde(default)]
  pub item_stats: Vec<ItemStat>,
  #[serde(default)]
  pub tag_stats: Vec<TagStat>,
  /// Tag ids per item id, in the item's own tag order
  #[serde(default)]
  pub item_tags: BTreeMap<i64, Vec<i64>>,
}

impl UserSnapshot {
  pub fn new(user_id: i64) -> Self {
    Self {
      user_id,
      ..Self::default()
    }
  }

  pub fn items_by_id(&self) -> HashMap<i64, &Item> {
    self.items.iter().map(|item| (item.id, item)).collect()
  }

  pub fn stats_by_item(&self) -> HashMap<i64, &ItemStat> {
    self.item_stats.iter().map(|stat| (stat.item_id, stat)).collect()
  }

  pub fn tag_stats_by_id(&self) -> HashMap<i64, &TagStat> {
    self.tag_stats.iter().map(|ts| (ts.tag_id, ts)).collect()
  }

  /// Tags linked to an item; None when the item has no association entry.
  pub fn tags_for(&self, item_id: i64) -> Option<&[i64]> {
    self.item_tags.get(&item_id).map(Vec::as_slice)
  }

  /// Reject confidences outside 0-100.
  pub fn validate(&self) -> Result<(), PlannerError> {
    let invalid = |reason: String| PlannerError::InvalidSnapshot {
      user_id: self.user_id,
      reason,
    };

    for stat in &self.item_stats {
      if stat.confidence > 100 {
        return Err(invalid(format!(
          "item {} confidence {} exceeds 100",
          stat.item_id, stat.confidence
        )));
      }
      if !is_percentage(stat.avg_confidence) {
        return Err(invalid(format!(
          "item {} average confidence {} outside 0-100",
          stat.item_id, stat.avg_confidence
        )));
      }
    }
    for ts in &self.tag_stats {
      if !is_percentage(ts.avg_confidence) {
        return Err(invalid(format!(
          "tag {} average confidence {} outside 0-100",
          ts.tag_id, ts.avg_confidence
        )));
      }
    }
    Ok(())
  }
}

fn is_percentage(value: f64) -> bool {
  (0.0..=100.0).contains(&value)
}
