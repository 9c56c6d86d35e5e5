use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use study_planner::{config, domain::UserSnapshot, templates, Planner};

/// Revision session planner
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Plan a session from a user snapshot and print it as JSON
  Plan {
    /// Path to the user snapshot JSON
    snapshot: PathBuf,

    /// Preset template key
    template_key: String,

    /// Override the template's duration in minutes
    #[arg(long)]
    duration: Option<u32>,

    /// Focus tag for `specific` tag mode
    #[arg(long = "tag")]
    tag_id: Option<i64>,
  },

  /// List the preset templates
  Templates,
}

fn read_snapshot(path: &Path) -> Result<UserSnapshot, String> {
  let contents = std::fs::read_to_string(path)
    .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
  serde_json::from_str(&contents)
    .map_err(|e| format!("Invalid snapshot {}: {}", path.display(), e))
}

fn run_plan(
  snapshot_path: &Path,
  template_key: &str,
  duration: Option<u32>,
  tag_id: Option<i64>,
) -> Result<(), String> {
  let config = config::load().map_err(|e| e.to_string())?;
  let planner = Planner::new(config);

  let mut template = templates::resolve(template_key).map_err(|e| e.to_string())?;
  if let Some(minutes) = duration {
    template = template.with_duration(minutes);
  }
  if let Some(tag_id) = tag_id {
    template = template.with_tag(tag_id);
  }
  template.validate().map_err(|e| e.to_string())?;

  let snapshot = read_snapshot(snapshot_path)?;
  tracing::info!(
    "Planning '{}' for user {} ({} items)",
    template.key,
    snapshot.user_id,
    snapshot.items.len()
  );

  let selection = planner
    .plan(&snapshot, &template, chrono::Utc::now())
    .map_err(|e| format!("{} ({})", e.user_message(), e))?;
  let json = serde_json::to_string_pretty(&selection).map_err(|e| e.to_string())?;
  println!("{}", json);
  Ok(())
}

fn list_templates() {
  for t in templates::presets() {
    println!("{:<24} {:>4} min  {}", t.key, t.duration_minutes, t.display_name);
  }
}

fn main() -> ExitCode {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "study_planner=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let cli = Cli::parse();
  let result = match cli.command {
    Commands::Plan {
      snapshot,
      template_key,
      duration,
      tag_id,
    } => run_plan(&snapshot, &template_key, duration, tag_id),
    Commands::Templates => {
      list_templates();
      Ok(())
    }
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      tracing::error!("{}", e);
      ExitCode::FAILURE
    }
  }
}
