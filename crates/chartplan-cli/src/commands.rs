//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Chartplan: exhaustive test plans from statechart files
#[derive(Parser, Debug)]
#[command(name = "chartplan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Synthesis log level; overrides -v
    #[arg(long, global = true, env = "CHARTPLAN_LOG_LEVEL")]
    pub log_level: Option<LogLevelArg>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synthesize test plans from a chart file
    Plan(PlanArgs),

    /// Validate a chart file against every guard assignment
    Check(CheckArgs),
}

/// Arguments for the plan command
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Chart file (YAML or JSON)
    pub file: PathBuf,

    /// Skip plans with this exact description
    #[arg(long = "skip-plan", value_name = "DESCRIPTION")]
    pub skip_plans: Vec<String>,

    /// Skip plans whose description matches this regex
    #[arg(long = "skip-plan-regex", value_name = "REGEX")]
    pub skip_plan_regexes: Vec<String>,

    /// Skip paths with this exact description
    #[arg(long = "skip-path", value_name = "DESCRIPTION")]
    pub skip_paths: Vec<String>,

    /// Skip paths whose description matches this regex
    #[arg(long = "skip-path-regex", value_name = "REGEX")]
    pub skip_path_regexes: Vec<String>,

    /// Keep plans whose paths were all skipped
    #[arg(long)]
    pub keep_empty_plans: bool,

    /// Vary only these guards (comma separated); others keep their defaults
    #[arg(long = "vary-guard", value_delimiter = ',', value_name = "GUARD")]
    pub vary_guards: Vec<String>,

    /// Most guards varied together
    #[arg(long, default_value_t = chartplan::DEFAULT_MAX_GUARDS)]
    pub max_guards: usize,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: PlanOutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Chart file (YAML or JSON)
    pub file: PathBuf,

    /// Most guards varied together
    #[arg(long, default_value_t = chartplan::DEFAULT_MAX_GUARDS)]
    pub max_guards: usize,
}

/// Output format for plans
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlanOutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log level argument for CLI
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevelArg {
    /// No synthesis logging
    None,
    /// Plan report
    Info,
    /// Visited states and fired events
    Debug,
    /// Synthesis internals
    Trace,
}

impl From<LogLevelArg> for chartplan::LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::None => Self::None,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Debug => Self::Debug,
            LogLevelArg::Trace => Self::Trace,
        }
    }
}
