pub mod config;
pub mod domain;
pub mod error;
pub mod scoring;
pub mod session;
pub mod srs;
pub mod stats;
pub mod templates;

#[cfg(test)]
pub(crate) mod testing;

use chrono::{DateTime, Utc};

use config::PlannerConfig;
use domain::{ItemStat, Outcome, ScheduleState, UserSnapshot};
use error::PlannerError;
use scoring::ScoreResult;
use session::SessionSelection;
use stats::AttemptRecord;
use templates::TemplateConfig;

/// Engine entry points bound to one validated configuration.
#[derive(Debug, Clone, Default)]
pub struct Planner {
  config: PlannerConfig,
}

impl Planner {
  pub fn new(config: PlannerConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &PlannerConfig {
    &self.config
  }

  /// Score every item in the snapshot with the configured weights.
  pub fn compute_scores(&self, snapshot: &UserSnapshot, now: DateTime<Utc>) -> Vec<ScoreResult> {
    scoring::compute_scores(snapshot, &self.config.weights, now, &self.config.tuning)
  }

  pub fn generate_session(
    &self,
    snapshot: &UserSnapshot,
    scores: &[ScoreResult],
    template: &TemplateConfig,
    now: DateTime<Utc>,
  ) -> Result<SessionSelection, PlannerError> {
    session::generate_session(snapshot, scores, template, now, &self.config.tuning)
  }

  /// Score with the template's emphasis applied, then generate a session.
  pub fn plan(
    &self,
    snapshot: &UserSnapshot,
    template: &TemplateConfig,
    now: DateTime<Utc>,
  ) -> Result<SessionSelection, PlannerError> {
    let weights = scoring::apply_emphasis(&self.config.weights, template.emphasis);
    let scores = scoring::compute_scores(snapshot, &weights, now, &self.config.tuning);
    self.generate_session(snapshot, &scores, template, now)
  }

  pub fn advance_schedule(
    &self,
    previous: &ScheduleState,
    outcome: Outcome,
    confidence: u8,
    now: DateTime<Utc>,
  ) -> ScheduleState {
    srs::advance_schedule(previous, outcome, confidence, now)
  }

  /// Fold an attempt into `stat`, keeping the configured history length.
  pub fn record_attempt(&self, stat: &mut ItemStat, attempt: &AttemptRecord) {
    stat.record_attempt(attempt, self.config.tuning.history_len);
  }
}
