//! Chartplan CLI Library
//!
//! Command-line interface for synthesizing test plans from statechart files.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{CheckArgs, Cli, ColorArg, Commands, LogLevelArg, PlanArgs, PlanOutputFormat};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{filter_directive, init_tracing, render_plans_json, render_plans_text};
