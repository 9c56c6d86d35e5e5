//! Multi-pass greedy allocation under a time budget.

use std::collections::{HashMap, HashSet};

use crate::config::{DIVERSITY_OVERFLOW_PCT, MIN_COUNT_OVERFLOW_PCT};
use crate::templates::TemplateConfig;

use super::Candidate;

/// Budget and diversity limits for one allocation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationLimits {
  pub duration_minutes: u32,
  /// None disables the per-tag cap
  pub max_same_tag: Option<u32>,
  pub min_distinct_tags: Option<u32>,
  pub min_items: Option<u32>,
}

impl AllocationLimits {
  pub fn from_template(template: &TemplateConfig, cap_tags: bool) -> Self {
    Self {
      duration_minutes: template.duration_minutes,
      max_same_tag: cap_tags.then_some(template.max_same_tag),
      min_distinct_tags: template.min_distinct_tags,
      min_items: template.min_items,
    }
  }

  fn overflow_budget(&self, pct: u32) -> u32 {
    self.duration_minutes * pct / 100
  }
}

#[derive(Debug, Clone, Default)]
pub struct Allocation<'a> {
  pub selected: Vec<&'a Candidate>,
  pub total_minutes: u32,
  pub quick_wins: u32,
}

impl Allocation<'_> {
  pub fn is_empty(&self) -> bool {
    self.selected.is_empty()
  }
}

/// Running selection state shared by the passes.
struct Allocator<'s, 'a> {
  candidates: &'s [&'a Candidate],
  used: Vec<bool>,
  tag_counts: HashMap<i64, u32>,
  allocation: Allocation<'a>,
}

impl<'s, 'a> Allocator<'s, 'a> {
  fn new(candidates: &'s [&'a Candidate]) -> Self {
    Self {
      candidates,
      used: vec![false; candidates.len()],
      tag_counts: HashMap::new(),
      allocation: Allocation::default(),
    }
  }

  fn fits(&self, candidate: &Candidate, budget: u32) -> bool {
    self.allocation.total_minutes + candidate.estimated_minutes <= budget
  }

  fn within_tag_cap(&self, candidate: &Candidate, cap: Option<u32>) -> bool {
    match cap {
      None => true,
      Some(cap) => candidate
        .tags
        .iter()
        .all(|t| self.tag_counts.get(t).copied().unwrap_or(0) < cap),
    }
  }

  fn adds_new_tag(&self, candidate: &Candidate) -> bool {
    candidate.tags.iter().any(|t| !self.tag_counts.contains_key(t))
  }

  fn distinct_tags(&self) -> usize {
    self.tag_counts.len()
  }

  fn accept(&mut self, index: usize) {
    let candidate = self.candidates[index];
    self.used[index] = true;
    // Tags repeated on one item count once
    let unique: HashSet<i64> = candidate.tags.iter().copied().collect();
    for tag in unique {
      *self.tag_counts.entry(tag).or_insert(0) += 1;
    }
    self.allocation.total_minutes += candidate.estimated_minutes;
    if candidate.is_quick_win() {
      self.allocation.quick_wins += 1;
    }
    self.allocation.selected.push(candidate);
  }

  /// Pass 1: budget and per-tag cap.
  fn primary(&mut self, limits: &AllocationLimits) {
    for i in 0..self.candidates.len() {
      let c = self.candidates[i];
      if self.fits(c, limits.duration_minutes) && self.within_tag_cap(c, limits.max_same_tag) {
        self.accept(i);
      }
    }
  }

  /// Pass 2: new tags, up to 125% of the budget.
  fn diversity(&mut self, limits: &AllocationLimits) {
    let Some(min_tags) = limits.min_distinct_tags else {
      return;
    };
    let budget = limits.overflow_budget(DIVERSITY_OVERFLOW_PCT);
    for i in 0..self.candidates.len() {
      if self.distinct_tags() >= min_tags as usize {
        return;
      }
      let c = self.candidates[i];
      if !self.used[i] && self.adds_new_tag(c) && self.fits(c, budget) {
        self.accept(i);
      }
    }
    if self.distinct_tags() < min_tags as usize {
      tracing::debug!(
        "Diversity pass ended with {} of {} distinct tags",
        self.distinct_tags(),
        min_tags
      );
    }
  }

  /// Pass 3: any unused item, up to 150% of the budget.
  fn min_count(&mut self, limits: &AllocationLimits) {
    let Some(min_items) = limits.min_items else {
      return;
    };
    let budget = limits.overflow_budget(MIN_COUNT_OVERFLOW_PCT);
    for i in 0..self.candidates.len() {
      if self.allocation.selected.len() >= min_items as usize {
        return;
      }
      let c = self.candidates[i];
      if !self.used[i] && self.fits(c, budget) {
        self.accept(i);
      }
    }
  }
}

/// Run the primary, diversity and minimum-count passes over `candidates`,
/// which are considered in the given order.
pub fn allocate<'a>(candidates: &[&'a Candidate], limits: &AllocationLimits) -> Allocation<'a> {
  let mut allocator = Allocator::new(candidates);
  allocator.primary(limits);
  allocator.diversity(limits);
  allocator.min_count(limits);
  allocator.allocation
}

/// Force-accept the highest-scored candidate, ignoring every constraint.
/// The earliest candidate wins ties.
pub fn force_top<'a>(candidates: &[&'a Candidate]) -> Allocation<'a> {
  let mut best: Option<&'a Candidate> = None;
  for &c in candidates {
    if best.is_none_or(|b| c.score.score > b.score.score) {
      best = Some(c);
    }
  }

  match best {
    None => Allocation::default(),
    Some(c) => Allocation {
      selected: vec![c],
      total_minutes: c.estimated_minutes,
      quick_wins: u32::from(c.is_quick_win()),
    },
  }
}
