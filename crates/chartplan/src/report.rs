//! Human-readable and serializable views of a plan list.

use crate::machine::StateValue;
use crate::plan::TestPlan;
use serde::Serialize;
use std::fmt::Write as _;

const RULE_WIDTH: usize = 65;

/// Banner report listing every plan and the descriptions of its paths.
#[must_use]
pub fn render_report<C>(plans: &[TestPlan<C>]) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = format!("\n{rule}\nTestPlans:\n{rule}\n\n");
    for plan in plans {
        let _ = write!(out, "\n  {}", plan.description);
        for path in &plan.paths {
            let _ = write!(out, "\n    • {} ⬏", path.description);
        }
    }
    let _ = write!(out, "\n\n{rule}");
    out
}

/// One step of a [`PathSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentSummary {
    /// State before the event
    pub state: StateValue,
    /// Event type
    pub event: String,
}

/// Serializable view of a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathSummary {
    /// Path description
    pub description: String,
    /// Structural signature
    pub signature: String,
    /// Terminal state
    pub state: StateValue,
    /// Steps in order
    pub segments: Vec<SegmentSummary>,
}

/// Serializable view of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    /// Plan description
    pub description: String,
    /// Paths in order
    pub paths: Vec<PathSummary>,
}

/// Callback-free views of `plans`, e.g. for JSON output.
#[must_use]
pub fn summarize<C>(plans: &[TestPlan<C>]) -> Vec<PlanSummary> {
    plans
        .iter()
        .map(|plan| PlanSummary {
            description: plan.description.clone(),
            paths: plan
                .paths
                .iter()
                .map(|path| PathSummary {
                    description: path.description.clone(),
                    signature: path.signature(),
                    state: path.state.value.clone(),
                    segments: path
                        .segments
                        .iter()
                        .map(|segment| SegmentSummary {
                            state: segment.state.value.clone(),
                            event: segment.event.event_type.clone(),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::chart::StateNode;
    use crate::dedupe::dedupe;
    use crate::guards::Guards;
    use crate::hooks::TestEvents;
    use crate::search::StatechartPlanner;
    use crate::synthesize::PathPlanner;
    use serde_json::json;

    fn plans() -> Vec<TestPlan<()>> {
        let chart = StateNode::compound("A")
            .with_state("A", StateNode::leaf().on("GO", "B"))
            .with_state("B", StateNode::leaf());
        let events = TestEvents::new().with_sync_exec("GO", |_, _| Ok(()));
        dedupe(StatechartPlanner.simple_path_plans(&chart, &Guards::new(), &events).unwrap())
    }

    #[test]
    fn test_render_report_layout() {
        let rule = "=".repeat(65);
        let expected = format!("\n{rule}\nTestPlans:\n{rule}\n\n\n  A\n    •  ⬏\n  B\n    • A → GO ⬏\n\n{rule}");
        assert_eq!(render_report(&plans()), expected);
    }

    #[test]
    fn test_render_report_empty() {
        let report = render_report::<()>(&[]);
        assert!(report.contains("TestPlans:"));
        assert!(!report.contains('•'));
    }

    #[test]
    fn test_summary_serializes() {
        let summary = summarize(&plans());
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            value[1],
            json!({
                "description": "B",
                "paths": [{
                    "description": "A → GO",
                    "signature": "A → GO",
                    "state": "B",
                    "segments": [{"state": "A", "event": "GO"}]
                }]
            })
        );
    }
}
