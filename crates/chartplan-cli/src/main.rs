//! Chartplan CLI: test plans from statechart files
//!
//! ## Usage
//!
//! ```bash
//! chartplan plan door.yaml                   # List plans and paths
//! chartplan plan door.yaml --format json     # Machine-readable output
//! chartplan plan door.yaml --skip-plan open  # Leave a plan out
//! chartplan check door.yaml                  # Validate every guard assignment
//! ```

use chartplan_cli::{
    handlers::{execute_check, execute_plan},
    init_tracing, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity,
};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(&config);

    match &cli.command {
        Commands::Plan(args) => execute_plan(&config, args),
        Commands::Check(args) => execute_check(&config, args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet))
        .with_color(color)
        .with_log_level(cli.log_level.map(Into::into))
}
