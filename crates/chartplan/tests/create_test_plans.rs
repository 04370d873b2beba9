//! End-to-end tests for plan synthesis
//!
//! Exercises the whole pipeline through the public API: augmentation,
//! event wrapping, guard combinations, path search, dedup and filtering.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use chartplan::{
    create_test_plans, create_test_plans_with, Guard, Guards, LogLevel, MachineDefinition, Pattern,
    PathPlanner, PlanError, PlanOptions, PlanResult, ReplayError, SkipConfig, StateNode, StatechartPlanner,
    StateTests, TestEvents, TestPlan, TransitionDef,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Trace = Vec<String>;

fn gate() -> MachineDefinition<Trace> {
    let chart = StateNode::compound("A")
        .with_state("A", StateNode::leaf().on("GO", TransitionDef::to("B").when("canGo")))
        .with_state("B", StateNode::leaf());
    MachineDefinition::new(chart).with_guard("canGo", Guard::constant(false))
}

fn turnstile() -> MachineDefinition<Trace> {
    let chart = StateNode::compound("locked")
        .with_id("turnstile")
        .with_state(
            "locked",
            StateNode::leaf()
                .on("COIN", TransitionDef::to("unlocked").when("validCoin"))
                .on("KICK", TransitionDef::to("broken").when("fragile")),
        )
        .with_state(
            "unlocked",
            StateNode::leaf().on("PUSH", "locked").on("KICK", TransitionDef::to("broken").when("fragile")),
        )
        .with_state(
            "broken",
            StateNode::compound("waiting")
                .with_state("waiting", StateNode::leaf().on("REPAIR", "repairing"))
                .with_state("repairing", StateNode::leaf().on("DONE", "#turnstile.locked")),
        );
    MachineDefinition::new(chart)
        .with_guard("fragile", Guard::constant(false))
        .with_guard("validCoin", Guard::constant(true))
}

fn recording_events() -> TestEvents<Trace> {
    ["COIN", "DONE", "GO", "KICK", "PUSH", "REPAIR"]
        .into_iter()
        .fold(TestEvents::new(), |events, name| {
            events.with_sync_exec(name, |ctx: &mut Trace, event| {
                ctx.push(format!("→ {}", event.event_type));
                Ok(())
            })
        })
}

fn recording_tests() -> StateTests<Trace> {
    StateTests::new()
        .with_sync_test("A", |ctx: &mut Trace, state| {
            ctx.push(format!("check {}", state.value));
            Ok(())
        })
        .with_sync_test("B", |ctx: &mut Trace, state| {
            ctx.push(format!("check {}", state.value));
            Ok(())
        })
}

fn descriptions<C>(plans: &[TestPlan<C>]) -> Vec<String> {
    plans.iter().map(|p| p.description.clone()).collect()
}

fn signatures<C>(plans: &[TestPlan<C>]) -> Vec<Vec<String>> {
    plans.iter().map(TestPlan::signatures).collect()
}

/// Delegates to the built-in planner and counts calls.
#[derive(Default)]
struct Counting {
    calls: AtomicUsize,
}

impl<C> PathPlanner<C> for Counting {
    fn simple_path_plans(
        &self,
        chart: &StateNode<C>,
        guards: &Guards,
        events: &TestEvents<C>,
    ) -> PlanResult<Vec<TestPlan<C>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        StatechartPlanner.simple_path_plans(chart, guards, events)
    }
}

// ============================================================================
// Two-state scenario
// ============================================================================

#[test]
fn test_gate_scenario() {
    let plans = create_test_plans(&gate(), &recording_tests(), &recording_events(), &PlanOptions::new())
        .expect("plans");

    assert_eq!(descriptions(&plans), vec!["A", "B"]);
    assert_eq!(
        signatures(&plans),
        vec![vec![String::new()], vec!["A → GO".to_string()]]
    );
}

#[test]
fn test_gate_scenario_skip_initial_plan() {
    let options = PlanOptions::new().with_skip(SkipConfig::new().skip_plan("A"));
    let plans = create_test_plans(&gate(), &recording_tests(), &recording_events(), &options).unwrap();

    assert_eq!(descriptions(&plans), vec!["B"]);
    assert_eq!(plans[0].paths.len(), 1);
    assert_eq!(plans[0].paths[0].description, "A → GO");
}

#[tokio::test]
async fn test_gate_scenario_replay() {
    let plans = create_test_plans(&gate(), &recording_tests(), &recording_events(), &PlanOptions::new())
        .unwrap();

    let mut ctx = Vec::new();
    plans[1].paths[0].test(&mut ctx).await.unwrap();
    assert_eq!(ctx, vec!["check A", "→ GO", "check B"]);

    plans[0].test(Vec::new).await.unwrap();
}

#[tokio::test]
async fn test_failing_state_test_stops_replay() {
    let tests = StateTests::new()
        .with_sync_test("A", |ctx: &mut Trace, state| {
            ctx.push(format!("check {}", state.value));
            Err("display blank".into())
        })
        .with_sync_test("B", |ctx: &mut Trace, state| {
            ctx.push(format!("check {}", state.value));
            Ok(())
        });
    let plans = create_test_plans(&gate(), &tests, &recording_events(), &PlanOptions::new()).unwrap();

    let mut ctx = Vec::new();
    let err = plans[1].paths[0].test(&mut ctx).await.unwrap_err();
    match err {
        ReplayError::StateTest { state, source } => {
            assert_eq!(state, "A");
            assert_eq!(source.to_string(), "display blank");
        }
        other => panic!("unexpected error {other:?}"),
    }
    // Neither the GO executor nor the test for B ran.
    assert_eq!(ctx, vec!["check A"]);

    assert!(matches!(
        plans[1].test(Vec::new).await,
        Err(ReplayError::StateTest { .. })
    ));
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_idempotent() {
    let first = create_test_plans(&turnstile(), &StateTests::new(), &recording_events(), &PlanOptions::new())
        .unwrap();
    let second = create_test_plans(
        &turnstile(),
        &StateTests::new(),
        &recording_events(),
        &PlanOptions::new().with_log_level(LogLevel::Trace),
    )
    .unwrap();

    assert_eq!(descriptions(&first), descriptions(&second));
    assert_eq!(signatures(&first), signatures(&second));
}

#[test]
fn test_guard_coverage_calls_planner_per_assignment() {
    let planner = Counting::default();
    let plans = create_test_plans_with(
        &planner,
        &turnstile(),
        &StateTests::new(),
        &recording_events(),
        &PlanOptions::new(),
    )
    .unwrap();

    assert_eq!(planner.calls.load(Ordering::SeqCst), 4);
    // Reaching `broken` needs fragile=true, which the supplied guard never is.
    assert!(descriptions(&plans).contains(&"broken.waiting".to_string()));
    assert!(descriptions(&plans).contains(&"broken.repairing".to_string()));
}

#[test]
fn test_no_guards_single_planner_call() {
    let chart = StateNode::compound("a")
        .with_state("a", StateNode::leaf().on("PUSH", "b"))
        .with_state("b", StateNode::leaf());
    let planner = Counting::default();

    let plans = create_test_plans_with(
        &planner,
        &MachineDefinition::new(chart),
        &StateTests::new(),
        &recording_events(),
        &PlanOptions::new(),
    )
    .unwrap();

    assert_eq!(planner.calls.load(Ordering::SeqCst), 1);
    assert_eq!(plans.len(), 2);
}

#[test]
fn test_vary_subset_keeps_other_guards() {
    let planner = Counting::default();
    let options = PlanOptions::new().with_vary_guards(["validCoin"]);
    let plans =
        create_test_plans_with(&planner, &turnstile(), &StateTests::new(), &recording_events(), &options).unwrap();

    assert_eq!(planner.calls.load(Ordering::SeqCst), 2);
    assert_eq!(descriptions(&plans), vec!["locked", "unlocked"]);
}

#[test]
fn test_guard_limit() {
    let options = PlanOptions::new().with_max_guards(1);
    let result = create_test_plans(&turnstile(), &StateTests::new(), &recording_events(), &options);
    assert!(matches!(
        result,
        Err(PlanError::GuardLimitExceeded { count: 2, limit: 1 })
    ));
}

#[test]
fn test_dedup_no_duplicate_signatures() {
    let plans = create_test_plans(&turnstile(), &StateTests::new(), &recording_events(), &PlanOptions::new())
        .unwrap();

    let mut seen = std::collections::HashSet::new();
    for plan in &plans {
        assert!(seen.insert(plan.description.clone()), "duplicate plan {}", plan.description);
        let mut sigs = std::collections::HashSet::new();
        for signature in plan.signatures() {
            assert!(sigs.insert(signature.clone()), "duplicate path {signature}");
        }
    }
    let unlocked = plans.iter().find(|p| p.description == "unlocked").unwrap();
    // The only other route into `unlocked` would revisit `locked`.
    assert_eq!(unlocked.signatures(), vec!["locked → COIN".to_string()]);
}

#[test]
fn test_filter_removes_matches() {
    let skip = SkipConfig::new()
        .skip_plan(Pattern::regex("^broken").unwrap())
        .skip_path(Pattern::regex("KICK").unwrap());
    let options = PlanOptions::new().with_skip(skip);
    let plans = create_test_plans(&turnstile(), &StateTests::new(), &recording_events(), &options).unwrap();

    assert_eq!(descriptions(&plans), vec!["locked", "unlocked"]);
    for plan in &plans {
        for path in &plan.paths {
            assert!(!path.description.contains("KICK"));
        }
    }
}

#[test]
fn test_inputs_not_mutated() {
    let machine = turnstile();
    let tests = recording_tests();
    let events = recording_events();
    let config_before = serde_json::to_value(&machine.config).unwrap();
    let tests_before = format!("{tests:?}");
    let events_before = format!("{events:?}");

    create_test_plans(&machine, &tests, &events, &PlanOptions::new()).unwrap();

    assert_eq!(serde_json::to_value(&machine.config).unwrap(), config_before);
    assert!(machine.config.child("locked").unwrap().meta.test.is_none());
    assert_eq!(format!("{tests:?}"), tests_before);
    assert_eq!(format!("{events:?}"), events_before);
}

// ============================================================================
// Logging
// ============================================================================

fn capture(level: LogLevel) -> (PlanOptions, Arc<Mutex<Vec<(LogLevel, String)>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink_lines = Arc::clone(&lines);
    let options = PlanOptions::new()
        .with_log_level(level)
        .with_log_sink(Arc::new(move |given, message: &str| {
            sink_lines.lock().unwrap().push((given, message.to_string()));
        }));
    (options, lines)
}

#[test]
fn test_report_logged_at_info() {
    let (options, lines) = capture(LogLevel::Info);
    create_test_plans(&gate(), &recording_tests(), &recording_events(), &options).unwrap();

    let lines = lines.lock().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0, LogLevel::Info);
    assert!(lines[0].1.contains("TestPlans:"));
    assert!(lines[0].1.contains("• A → GO ⬏"));
}

#[test]
fn test_silent_by_default() {
    let (options, lines) = capture(LogLevel::None);
    create_test_plans(&gate(), &recording_tests(), &recording_events(), &options).unwrap();
    assert!(lines.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_replay_logs_states_and_events_at_debug() {
    let (options, lines) = capture(LogLevel::Debug);
    let plans = create_test_plans(&gate(), &recording_tests(), &recording_events(), &options).unwrap();
    lines.lock().unwrap().clear();

    plans[1].paths[0].test(&mut Vec::new()).await.unwrap();

    let logged: Vec<String> = lines.lock().unwrap().iter().map(|(_, m)| m.clone()).collect();
    assert_eq!(logged, vec!["    A", "    → GO", "    B"]);
}
