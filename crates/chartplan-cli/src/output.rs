//! Output formatting and log setup

use crate::config::CliConfig;
use chartplan::{LogLevel, PlanSummary};
use console::style;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter directive for the `chartplan` log target at `level`.
#[must_use]
pub fn filter_directive(level: LogLevel) -> String {
    let level = match level {
        LogLevel::None => "off",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };
    format!("warn,chartplan={level}")
}

/// Install a stderr subscriber for library logs. `RUST_LOG` takes
/// precedence over the configured level.
pub fn init_tracing(config: &CliConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config.effective_log_level())));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(config.color.should_color())
                .with_target(false)
                .without_time(),
        )
        .try_init();
}

/// Render plans as an indented listing.
#[must_use]
pub fn render_plans_text(plans: &[PlanSummary], use_color: bool) -> String {
    let mut out = String::new();
    for plan in plans {
        let title = if use_color {
            style(&plan.description).bold().cyan().to_string()
        } else {
            plan.description.clone()
        };
        out.push_str(&format!("{title}\n"));
        for path in &plan.paths {
            let description = if path.segments.is_empty() {
                "(initial state)".to_string()
            } else {
                path.description.clone()
            };
            let bullet = if use_color {
                style("•").green().to_string()
            } else {
                "•".to_string()
            };
            out.push_str(&format!("  {bullet} {description}\n"));
        }
    }
    let path_count: usize = plans.iter().map(|plan| plan.paths.len()).sum();
    let summary = format!("{} plans, {path_count} paths", plans.len());
    if use_color {
        out.push_str(&format!("\n{}\n", style(summary).dim()));
    } else {
        out.push_str(&format!("\n{summary}\n"));
    }
    out
}

/// Render plans as pretty JSON.
pub fn render_plans_json(plans: &[PlanSummary]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(plans)
}
