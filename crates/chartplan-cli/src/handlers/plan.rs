//! Plan command handler

use crate::commands::{PlanArgs, PlanOutputFormat};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{render_plans_json, render_plans_text};
use chartplan::{
    create_test_plans, summarize, ChartFile, Pattern, PlanOptions, PlanSummary, SkipConfig, StateTests,
};
use std::path::Path;

/// Read and parse a chart file. `.json` files are parsed as JSON, anything
/// else as YAML.
pub fn load_chart(path: &Path) -> CliResult<ChartFile<()>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::chart(path, format!("failed to read: {e}")))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        ChartFile::from_json(&content)
    } else {
        ChartFile::from_yaml(&content)
    };
    parsed.map_err(|e| CliError::chart(path, e.to_string()))
}

/// Skip configuration from the chart file extended with command-line flags.
pub fn build_skip(base: Option<SkipConfig>, args: &PlanArgs) -> CliResult<SkipConfig> {
    let mut skip = base.unwrap_or_default();
    skip.plans.extend(args.skip_plans.iter().map(|s| Pattern::exact(s.as_str())));
    for expr in &args.skip_plan_regexes {
        skip.plans.push(Pattern::regex(expr)?);
    }
    skip.paths.extend(args.skip_paths.iter().map(|s| Pattern::exact(s.as_str())));
    for expr in &args.skip_path_regexes {
        skip.paths.push(Pattern::regex(expr)?);
    }
    skip.keep_empty_plans |= args.keep_empty_plans;
    Ok(skip)
}

/// Synthesize plans for a parsed chart file.
pub fn plan_chart(config: &CliConfig, chart: &ChartFile<()>, args: &PlanArgs) -> CliResult<Vec<PlanSummary>> {
    let mut options = PlanOptions::new()
        .with_log_level(config.effective_log_level())
        .with_skip(build_skip(chart.skip.clone(), args)?)
        .with_max_guards(args.max_guards);
    if !args.vary_guards.is_empty() {
        let unknown: Vec<&String> = args
            .vary_guards
            .iter()
            .filter(|name| !chart.guards.contains_key(*name))
            .collect();
        if !unknown.is_empty() {
            return Err(CliError::invalid_argument(format!(
                "--vary-guard names undeclared guards: {unknown:?}"
            )));
        }
        options = options.with_vary_guards(args.vary_guards.iter().cloned());
    }

    let plans = create_test_plans(
        &chart.machine_definition(),
        &StateTests::new(),
        &chart.test_events(),
        &options,
    )?;
    Ok(summarize(&plans))
}

/// Execute the plan command
pub fn execute_plan(config: &CliConfig, args: &PlanArgs) -> CliResult<()> {
    let chart = load_chart(&args.file)?;
    let plans = plan_chart(config, &chart, args)?;
    tracing::debug!(file = %args.file.display(), plans = plans.len(), "synthesized test plans");

    let rendered = match args.format {
        PlanOutputFormat::Text => {
            let use_color = args.output.is_none() && config.color.should_color();
            render_plans_text(&plans, use_color)
        }
        PlanOutputFormat::Json => render_plans_json(&plans)? + "\n",
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            if !config.verbosity.is_quiet() {
                eprintln!("Wrote {} plans to {}", plans.len(), path.display());
            }
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::commands::Cli;
    use crate::Commands;
    use clap::Parser;

    const GATE: &str = r"
machine:
  initial: A
  states:
    A:
      on:
        GO: { target: B, cond: canGo }
    B: {}
guards:
  canGo: false
events:
  GO:
";

    fn args(extra: &[&str]) -> PlanArgs {
        let mut argv = vec!["chartplan", "plan", "gate.yaml"];
        argv.extend_from_slice(extra);
        let Commands::Plan(args) = Cli::try_parse_from(argv).unwrap().command else {
            panic!("expected plan command");
        };
        args
    }

    fn descriptions(plans: &[PlanSummary]) -> Vec<&str> {
        plans.iter().map(|p| p.description.as_str()).collect()
    }

    #[test]
    fn test_plan_chart_explores_guards() {
        let chart = ChartFile::from_yaml(GATE).unwrap();
        let plans = plan_chart(&CliConfig::new(), &chart, &args(&[])).unwrap();
        assert_eq!(descriptions(&plans), vec!["A", "B"]);
        assert_eq!(plans[1].paths[0].signature, "A → GO");
    }

    #[test]
    fn test_skip_flags() {
        let chart = ChartFile::from_yaml(GATE).unwrap();
        let plans = plan_chart(&CliConfig::new(), &chart, &args(&["--skip-plan", "A"])).unwrap();
        assert_eq!(descriptions(&plans), vec!["B"]);

        let plans = plan_chart(&CliConfig::new(), &chart, &args(&["--skip-path-regex", "GO"])).unwrap();
        assert_eq!(descriptions(&plans), vec!["A"]);
    }

    #[test]
    fn test_skip_merges_file_and_flags() {
        let base = SkipConfig::new().skip_plan("X");
        let skip = build_skip(Some(base), &args(&["--skip-plan", "Y", "--keep-empty-plans"])).unwrap();
        assert_eq!(skip.plans, vec![Pattern::exact("X"), Pattern::exact("Y")]);
        assert!(skip.keep_empty_plans);
    }

    #[test]
    fn test_invalid_regex_flag() {
        let result = build_skip(None, &args(&["--skip-plan-regex", "("]));
        assert!(matches!(result, Err(CliError::Plan(_))));
    }

    #[test]
    fn test_unknown_vary_guard() {
        let chart = ChartFile::from_yaml(GATE).unwrap();
        let result = plan_chart(&CliConfig::new(), &chart, &args(&["--vary-guard", "nope"]));
        assert!(matches!(result, Err(CliError::InvalidArgument { .. })));
    }

    #[test]
    fn test_load_chart_missing_file() {
        let result = load_chart(Path::new("/definitely/not/here.yaml"));
        assert!(matches!(result, Err(CliError::Chart { .. })));
    }
}
