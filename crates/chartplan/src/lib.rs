//! Chartplan: exhaustive, deduplicated test plans from statecharts
//!
//! Given a hierarchical statechart, per-state test callbacks and per-event
//! executors, chartplan produces test plans: one plan per reachable state,
//! each holding every simple path that reaches it. A runner replays a path
//! by running state tests and firing event executors in order.
//!
//! # Pipeline
//!
//! ```text
//! ┌───────────┐   ┌───────────┐   ┌──────────────┐   ┌─────────────┐
//! │ augment   │──►│ wrap      │──►│ combinations │──►│ synthesize  │
//! │ (hooks)   │   │ (events)  │   │ (2^G guards) │   │ (per guard) │
//! └───────────┘   └───────────┘   └──────────────┘   └──────┬──────┘
//!                                                           │
//!                              ┌──────────┐   ┌─────────┐   │
//!                              │ filter   │◄──│ dedupe  │◄──┘
//!                              └──────────┘   └─────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use chartplan::{
//!     create_test_plans, Guard, MachineDefinition, PlanOptions, StateNode, StateTests,
//!     TestEvents, TransitionDef,
//! };
//!
//! let chart = StateNode::compound("A")
//!     .with_state("A", StateNode::leaf().on("GO", TransitionDef::to("B").when("canGo")))
//!     .with_state("B", StateNode::leaf());
//! let machine = MachineDefinition::new(chart).with_guard("canGo", Guard::constant(true));
//! let events: TestEvents<()> = TestEvents::new().with_sync_exec("GO", |_, _| Ok(()));
//!
//! let plans = create_test_plans(&machine, &StateTests::new(), &events, &PlanOptions::new())?;
//! assert_eq!(plans.len(), 2);
//! assert_eq!(plans[1].signatures(), vec!["A → GO".to_string()]);
//! # Ok::<(), chartplan::PlanError>(())
//! ```

#![warn(missing_docs)]

mod augment;
mod chart;
mod config;
mod dedupe;
mod events;
mod filter;
mod guards;
mod hooks;
mod logger;
mod machine;
mod plan;
mod report;
mod result;
mod search;
mod synthesize;

pub use augment::augment;
pub use chart::{
    ChartFile, EventSpec, MachineDefinition, MachineOptions, StateMeta, StateNode, TransitionConfig,
    TransitionDef,
};
pub use config::PlanOptions;
pub use dedupe::dedupe;
pub use events::wrap_events;
pub use filter::{filter_plans, Pattern, SkipConfig};
pub use guards::{
    combinations, combinations_of, varied_guards, Guard, GuardAssignment, Guards, BITMASK_LIMIT,
    DEFAULT_MAX_GUARDS,
};
pub use hooks::{
    Event, EventConfig, EventExecutor, HookFuture, StateTest, StateTests, TestEvent, TestEvents,
    TestFunction,
};
pub use logger::{LogLevel, LogSink, Logger};
pub use machine::{Machine, State, StateValue};
pub use plan::{path_signature, Segment, TestPath, TestPlan, ARROW};
pub use report::{render_report, summarize, PathSummary, PlanSummary, SegmentSummary};
pub use result::{HookError, HookResult, PlanError, PlanResult, ReplayError};
pub use search::{simple_path_plans, StatechartPlanner};
pub use synthesize::{synthesize, PathPlanner};

/// Synthesize, deduplicate and filter test plans for `machine` using the
/// built-in [`StatechartPlanner`].
///
/// Neither `machine`, `tests` nor `events` is modified. The final plan list
/// is logged as a report at `Info`.
pub fn create_test_plans<C: 'static>(
    machine: &MachineDefinition<C>,
    tests: &StateTests<C>,
    events: &TestEvents<C>,
    options: &PlanOptions,
) -> PlanResult<Vec<TestPlan<C>>> {
    create_test_plans_with(&StatechartPlanner, machine, tests, events, options)
}

/// [`create_test_plans`] with a caller-supplied path planner.
pub fn create_test_plans_with<C, P>(
    planner: &P,
    machine: &MachineDefinition<C>,
    tests: &StateTests<C>,
    events: &TestEvents<C>,
    options: &PlanOptions,
) -> PlanResult<Vec<TestPlan<C>>>
where
    C: 'static,
    P: PathPlanner<C> + ?Sized,
{
    let logger = options.logger();
    let guards = &machine.options.guards;

    let chart = augment(&machine.config, tests, &logger);
    let events = wrap_events(events, &logger);
    let varied = varied_guards(guards, options.vary_guards.as_ref(), options.max_guards)?;
    let assignments = combinations_of(&varied)?;
    logger.trace(&format!(
        "{} guards varied, {} assignments",
        varied.len(),
        assignments.len()
    ));

    let plans = synthesize(planner, &chart, guards, &events, &assignments, &logger)?;
    let plans = filter_plans(dedupe(plans), &options.skip);

    logger.info(&render_report(&plans));
    Ok(plans)
}
