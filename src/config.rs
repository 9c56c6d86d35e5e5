//! Planner configuration.
//!
//! Scoring weights and engine tunables live in typed structs that are
//! validated once when loaded, instead of being parsed from loose settings
//! at scoring time.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::Difficulty;
use crate::error::ConfigError;

// ==================== File Locations ====================

/// Environment variable that overrides the configuration file path
pub const CONFIG_PATH_ENV: &str = "PLANNER_CONFIG";

/// Configuration file read when `PLANNER_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

// ==================== Session Constants ====================

/// Items estimated at or below this many minutes count as quick wins
pub const QUICK_WIN_MINUTES: u32 = 15;

/// Budget ceiling (percent of duration) for the tag diversity pass
pub const DIVERSITY_OVERFLOW_PCT: u32 = 125;

/// Budget ceiling (percent of duration) for the minimum item count pass
pub const MIN_COUNT_OVERFLOW_PCT: u32 = 150;

// ==================== Scoring Weights ====================

/// Weights for the seven urgency features.
///
/// Conventionally these sum to 1.0 so that scores land in [0, 1], but only
/// non-negativity is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeightConfig {
    pub confidence: f64,
    pub days: f64,
    pub attempts: f64,
    pub time: f64,
    pub difficulty: f64,
    pub failed: f64,
    pub tag: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            confidence: 0.30,
            days: 0.20,
            attempts: 0.10,
            time: 0.05,
            difficulty: 0.15,
            failed: 0.10,
            tag: 0.10,
        }
    }
}

impl WeightConfig {
    /// Weights in feature order: confidence, days, attempts, time, difficulty, failed, tag.
    pub fn as_array(&self) -> [f64; 7] {
        [
            self.confidence,
            self.days,
            self.attempts,
            self.time,
            self.difficulty,
            self.failed,
            self.tag,
        ]
    }

    pub fn total(&self) -> f64 {
        self.as_array().iter().sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("weights.confidence", self.confidence),
            ("weights.days", self.days),
            ("weights.attempts", self.attempts),
            ("weights.time", self.time),
            ("weights.difficulty", self.difficulty),
            ("weights.failed", self.failed),
            ("weights.tag", self.tag),
        ];
        for (key, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue(
                    key.to_string(),
                    format!("weight must be a finite number >= 0, got {}", value),
                ));
            }
        }
        Ok(())
    }

    /// Default weights overridden by any `PLANNER_W_*` variables present.
    fn from_env(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut weights = Self::default();
        let slots: [(&str, &mut f64); 7] = [
            ("PLANNER_W_CONFIDENCE", &mut weights.confidence),
            ("PLANNER_W_DAYS", &mut weights.days),
            ("PLANNER_W_ATTEMPTS", &mut weights.attempts),
            ("PLANNER_W_TIME", &mut weights.time),
            ("PLANNER_W_DIFFICULTY", &mut weights.difficulty),
            ("PLANNER_W_FAILED", &mut weights.failed),
            ("PLANNER_W_TAG", &mut weights.tag),
        ];
        for (key, slot) in slots {
            if let Some(raw) = lookup(key) {
                *slot = raw.trim().parse::<f64>().map_err(|e| {
                    ConfigError::InvalidValue(key.to_string(), format!("'{}': {}", raw, e))
                })?;
                tracing::info!("Using {} from environment: {}", key, slot);
            }
        }
        Ok(weights)
    }
}

// ==================== Engine Tunables ====================

/// Estimated solve minutes per difficulty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimateTable {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl Default for EstimateTable {
    fn default() -> Self {
        Self {
            easy: 12,
            medium: 25,
            hard: 45,
        }
    }
}

impl EstimateTable {
    pub fn minutes_for(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    /// Days after which recency urgency saturates
    pub recency_cap_days: u32,
    /// Attempts after which attempt persistence saturates
    pub attempt_cap: u32,
    /// Average solve seconds after which time complexity saturates
    pub time_cap_seconds: u32,
    /// Items due within this many days are flagged due soon
    pub due_soon_days: u32,
    /// Pools at or below this size skip difficulty distribution shaping
    pub small_pool_threshold: usize,
    /// Maximum pool size that distribution percentages are applied to
    pub distribution_pool_cap: usize,
    /// Length of the recent attempt history kept per item
    pub history_len: usize,
    pub estimates: EstimateTable,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            recency_cap_days: 30,
            attempt_cap: 10,
            time_cap_seconds: 3600,
            due_soon_days: 3,
            small_pool_threshold: 5,
            distribution_pool_cap: 20,
            history_len: 5,
            estimates: EstimateTable::default(),
        }
    }
}

impl Tuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("tuning.recency_cap_days", self.recency_cap_days as usize),
            ("tuning.attempt_cap", self.attempt_cap as usize),
            ("tuning.time_cap_seconds", self.time_cap_seconds as usize),
            ("tuning.distribution_pool_cap", self.distribution_pool_cap),
            ("tuning.estimates.easy", self.estimates.easy as usize),
            ("tuning.estimates.medium", self.estimates.medium as usize),
            ("tuning.estimates.hard", self.estimates.hard as usize),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue(
                    key.to_string(),
                    "must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// ==================== Planner Configuration ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub weights: WeightConfig,
    pub tuning: Tuning,
}

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    weights: Option<WeightConfig>,
    tuning: Option<Tuning>,
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.tuning.validate()
    }

    /// Parse and validate a complete configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError("<inline>".to_string(), e.to_string()))?;
        let config = Self {
            weights: file.weights.unwrap_or_default(),
            tuning: file.tuning.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Load configuration with priority: config.toml > environment > defaults.
pub fn load() -> Result<PlannerConfig, ConfigError> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let path = std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

    load_from(&path, |key| std::env::var(key).ok())
}

/// Load configuration from `path`, consulting `env` for weights the file omits.
pub fn load_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<PlannerConfig, ConfigError> {
    let file = read_config_file(path)?;
    let (file_weights, file_tuning) = match file {
        Some(f) => (f.weights, f.tuning),
        None => (None, None),
    };

    // Priority 1: config file
    let weights = match file_weights {
        Some(weights) => {
            tracing::info!("Using scoring weights from {}", path.display());
            weights
        }
        // Priority 2: environment, falling back to defaults per weight
        None => WeightConfig::from_env(&env)?,
    };

    let config = PlannerConfig {
        weights,
        tuning: file_tuning.unwrap_or_default(),
    };
    config.validate()?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Option<FileConfig>, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(None);
        }
        Err(e) => {
            return Err(ConfigError::IoError(
                path.display().to_string(),
                e.to_string(),
            ))
        }
    };

    toml::from_str::<FileConfig>(&contents)
        .map(Some)
        .map_err(|e| ConfigError::ParseError(path.display().to_string(), e.to_string()))
}
