//! Check command handler

use crate::commands::CheckArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::handlers::plan::load_chart;
use chartplan::{combinations_of, varied_guards, ChartFile, Machine};
use console::style;
use serde::Serialize;
use std::collections::BTreeSet;

/// Facts about a chart file that built for every guard assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    /// States below the root
    pub states: usize,
    /// Declared guards
    pub guards: usize,
    /// Guard assignments explored by `plan`
    pub assignments: usize,
    /// Declared event types
    pub events: usize,
    /// Event types used by transitions but not declared, so never fired
    pub unexercised_events: Vec<String>,
    /// Declared guards no transition references
    pub unused_guards: Vec<String>,
}

/// Build the machine under every guard assignment and collect facts.
///
/// Charts declaring more than `max_guards` guards are rejected before any
/// assignment is enumerated.
pub fn check_chart(chart: &ChartFile<()>, max_guards: usize) -> CliResult<CheckSummary> {
    let definition = chart.machine_definition();
    let guards = &definition.options.guards;

    let assignments = combinations_of(&varied_guards(guards, None, max_guards)?)?;
    let mut states = Machine::new(&definition.config, guards)?.state_count();
    for assignment in &assignments {
        states = Machine::new(&definition.config, &assignment.apply(guards))?.state_count();
    }

    let declared_events: BTreeSet<&String> = chart.events.keys().collect();
    let referenced_guards = chart.machine.guard_names();
    Ok(CheckSummary {
        states,
        guards: guards.len(),
        assignments: assignments.len().max(1),
        events: declared_events.len(),
        unexercised_events: chart
            .machine
            .event_types()
            .into_iter()
            .filter(|event| !declared_events.contains(event))
            .collect(),
        unused_guards: chart
            .guards
            .keys()
            .filter(|name| !referenced_guards.contains(*name))
            .cloned()
            .collect(),
    })
}

/// Execute the check command
pub fn execute_check(config: &CliConfig, args: &CheckArgs) -> CliResult<()> {
    let chart = load_chart(&args.file)?;
    let summary = check_chart(&chart, args.max_guards)?;
    tracing::debug!(file = %args.file.display(), assignments = summary.assignments, "chart checked");
    if config.verbosity.is_quiet() {
        return Ok(());
    }

    println!("{} {}", style("✓").green(), args.file.display());
    println!("  States: {}", summary.states);
    println!("  Guards: {} ({} assignments)", summary.guards, summary.assignments);
    println!("  Events: {}", summary.events);
    for event in &summary.unexercised_events {
        println!("  {} event '{event}' is never fired (not declared under events)", style("warning:").yellow());
    }
    for guard in &summary.unused_guards {
        println!("  {} guard '{guard}' is not referenced by any transition", style("warning:").yellow());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use chartplan::{PlanError, DEFAULT_MAX_GUARDS};
    use std::fmt::Write as _;

    #[test]
    fn test_check_counts() {
        let chart = ChartFile::from_yaml(
            r"
machine:
  initial: idle
  states:
    idle:
      on:
        START: { target: running, cond: ready }
        PING: idle
    running: {}
guards:
  ready: true
  spare: false
events:
  START:
",
        )
        .unwrap();

        let summary = check_chart(&chart, DEFAULT_MAX_GUARDS).unwrap();
        assert_eq!(summary.states, 2);
        assert_eq!(summary.guards, 2);
        assert_eq!(summary.assignments, 4);
        assert_eq!(summary.events, 1);
        assert_eq!(summary.unexercised_events, vec!["PING"]);
        assert_eq!(summary.unused_guards, vec!["spare"]);
    }

    #[test]
    fn test_check_without_guards() {
        let chart = ChartFile::from_yaml("machine:\n  initial: a\n  states:\n    a: {}\n").unwrap();
        let summary = check_chart(&chart, DEFAULT_MAX_GUARDS).unwrap();
        assert_eq!(summary.assignments, 1);
    }

    #[test]
    fn test_check_rejects_undeclared_guard() {
        let chart = ChartFile::from_yaml(
            "machine:\n  initial: a\n  states:\n    a: { on: { GO: { target: a, cond: nope } } }\n",
        )
        .unwrap();
        assert!(matches!(check_chart(&chart, DEFAULT_MAX_GUARDS), Err(CliError::Plan(_))));
    }

    fn many_guards(count: usize) -> ChartFile<()> {
        let mut yaml = String::from("machine:\n  initial: a\n  states:\n    a: {}\nguards:\n");
        for i in 0..count {
            let _ = writeln!(yaml, "  g{i}: true");
        }
        ChartFile::from_yaml(&yaml).unwrap()
    }

    #[test]
    fn test_check_enforces_guard_limit() {
        let result = check_chart(&many_guards(64), DEFAULT_MAX_GUARDS);
        assert!(matches!(
            result,
            Err(CliError::Plan(PlanError::GuardLimitExceeded { count: 64, limit: 16 }))
        ));

        let result = check_chart(&many_guards(3), 2);
        assert!(matches!(
            result,
            Err(CliError::Plan(PlanError::GuardLimitExceeded { count: 3, limit: 2 }))
        ));
        assert_eq!(check_chart(&many_guards(3), 3).unwrap().assignments, 8);
    }
}
