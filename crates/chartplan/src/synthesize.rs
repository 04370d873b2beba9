//! Plan synthesizer: one path search per guard assignment.

use crate::chart::StateNode;
use crate::guards::{GuardAssignment, Guards};
use crate::hooks::TestEvents;
use crate::logger::Logger;
use crate::plan::TestPlan;
use crate::result::PlanResult;

/// Simple-path search collaborator.
///
/// Builds an executable machine from `chart` with the given guard
/// implementations and enumerates its simple-path plans, replaying events
/// with the executors of `events`. Construction failures (unknown guards,
/// bad targets) are returned as errors and abort synthesis.
pub trait PathPlanner<C> {
    /// Enumerate simple-path plans.
    fn simple_path_plans(
        &self,
        chart: &StateNode<C>,
        guards: &Guards,
        events: &TestEvents<C>,
    ) -> PlanResult<Vec<TestPlan<C>>>;
}

/// Run `planner` once per assignment and concatenate the plans in
/// assignment order.
///
/// Each assignment overrides its guards on top of `guards`. With no
/// assignments the planner runs once with `guards` unchanged.
pub fn synthesize<C, P>(
    planner: &P,
    chart: &StateNode<C>,
    guards: &Guards,
    events: &TestEvents<C>,
    assignments: &[GuardAssignment],
    logger: &Logger,
) -> PlanResult<Vec<TestPlan<C>>>
where
    P: PathPlanner<C> + ?Sized,
{
    if assignments.is_empty() {
        logger.trace("synthesizing with machine guards");
        return planner.simple_path_plans(chart, guards, events);
    }

    let mut plans = Vec::new();
    for assignment in assignments {
        let found = planner.simple_path_plans(chart, &assignment.apply(guards), events)?;
        logger.trace(&format!(
            "guards #{} [{assignment}]: {} plans",
            assignment.index(),
            found.len()
        ));
        plans.extend(found);
    }
    Ok(plans)
}
