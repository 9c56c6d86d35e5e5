//! Error types surfaced by the planner.
//!
//! Session generation itself only fails when a user has nothing to plan
//! from; configuration and template problems are rejected at load time.

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String, String),
    ParseError(String, String),
    InvalidValue(String, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, err) => write!(f, "IO error reading {}: {}", path, err),
            ConfigError::ParseError(path, err) => write!(f, "Parse error in {}: {}", path, err),
            ConfigError::InvalidValue(key, reason) => {
                write!(f, "Invalid configuration value '{}': {}", key, reason)
            }
        }
    }
}

impl ConfigError {
    /// Returns a user-facing error message without exposing filesystem paths.
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::IoError(_, _) => "Failed to read planner configuration",
            ConfigError::ParseError(_, _) => "Failed to parse planner configuration",
            ConfigError::InvalidValue(_, _) => "Planner configuration contains an invalid value",
        }
    }
}

impl std::error::Error for ConfigError {}

/// Template lookup and validation errors.
#[derive(Debug)]
pub enum TemplateError {
    UnknownTemplate(String),
    ParseError(String),
    Invalid(String, String),
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::UnknownTemplate(key) => write!(f, "Unknown session template: {}", key),
            TemplateError::ParseError(err) => write!(f, "Template parse error: {}", err),
            TemplateError::Invalid(key, reason) => {
                write!(f, "Invalid template '{}': {}", key, reason)
            }
        }
    }
}

impl TemplateError {
    pub fn user_message(&self) -> &'static str {
        match self {
            TemplateError::UnknownTemplate(_) => "Session template not found",
            TemplateError::ParseError(_) => "Failed to parse session template",
            TemplateError::Invalid(_, _) => "Session template has conflicting constraints",
        }
    }
}

impl std::error::Error for TemplateError {}

/// Errors returned by the planner entry points.
#[derive(Debug)]
pub enum PlannerError {
    /// The user has no item statistics to build a session from.
    NoCandidates { user_id: i64 },
    /// A snapshot value is outside its documented range.
    InvalidSnapshot { user_id: i64, reason: String },
    Config(ConfigError),
    Template(TemplateError),
}

impl std::fmt::Display for PlannerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlannerError::NoCandidates { user_id } => {
                write!(f, "No candidate items for user {}", user_id)
            }
            PlannerError::InvalidSnapshot { user_id, reason } => {
                write!(f, "Invalid snapshot for user {}: {}", user_id, reason)
            }
            PlannerError::Config(err) => write!(f, "{}", err),
            PlannerError::Template(err) => write!(f, "{}", err),
        }
    }
}

impl PlannerError {
    pub fn user_message(&self) -> &'static str {
        match self {
            PlannerError::NoCandidates { .. } => "Add items to your library first",
            PlannerError::InvalidSnapshot { .. } => "Practice history contains invalid values",
            PlannerError::Config(err) => err.user_message(),
            PlannerError::Template(err) => err.user_message(),
        }
    }
}

impl std::error::Error for PlannerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlannerError::NoCandidates { .. } | PlannerError::InvalidSnapshot { .. } => None,
            PlannerError::Config(err) => Some(err),
            PlannerError::Template(err) => Some(err),
        }
    }
}

impl From<ConfigError> for PlannerError {
    fn from(err: ConfigError) -> Self {
        PlannerError::Config(err)
    }
}

impl From<TemplateError> for PlannerError {
    fn from(err: TemplateError) -> Self {
        PlannerError::Template(err)
    }
}
