//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for circle results
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Full formatted transcript with all turns
    Full,
    /// One line per message plus the outcome
    Compact,
    /// JSON output
    Json,
}

/// CLI arguments for fire-circle
#[derive(Parser, Debug)]
#[command(name = "fire-circle")]
#[command(author, version, about = "Fire Circle - Multi-entity dialogue orchestration")]
#[command(long_about = r#"
Fire Circle convenes a set of entities around a topic and runs a structured
dialogue: each round a turn-taking policy chooses the speakers, their turns
run in parallel under deadlines, and the session ends when the policy
completes, the turn cap is hit, or quorum is lost.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./circle.toml       Project-level config
3. ~/.config/fire-circle/config.toml   Global config

Example:
  fire-circle "How should we split the migration work?"
  fire-circle --policy consensus --threshold 0.66 "Adopt the new schema?"
  fire-circle --policy moderator_led --moderator ember "Plan the rollout"
"#)]
pub struct Cli {
    /// The topic to open the circle on
    pub topic: Option<String>,

    /// Turn-taking policy
    #[arg(short, long, value_name = "POLICY")]
    pub policy: Option<String>,

    /// Approval ratio for the consensus policy (exceed to conclude)
    #[arg(long, value_name = "RATIO")]
    pub threshold: Option<f64>,

    /// Moderator entity for the moderator_led policy
    #[arg(long, value_name = "ENTITY")]
    pub moderator: Option<String>,

    /// Maximum completed rounds before the session ends
    #[arg(long, value_name = "N")]
    pub max_turns: Option<usize>,

    /// Per-turn deadline in seconds
    #[arg(long, value_name = "SECS")]
    pub per_turn_timeout: Option<u64>,

    /// Whole-session deadline in seconds
    #[arg(long, value_name = "SECS")]
    pub session_timeout: Option<u64>,

    /// Minimum active entities required to continue
    #[arg(long, value_name = "N")]
    pub min_quorum: Option<usize>,

    /// Invocation retries before an entity is marked degraded
    #[arg(long, value_name = "N")]
    pub retries: Option<usize>,

    /// Close the session with a summarization turn
    #[arg(short, long)]
    pub summary: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write the transcript as JSONL to this path
    #[arg(long, value_name = "PATH")]
    pub transcript_log: Option<PathBuf>,

    /// Write diagnostic logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
