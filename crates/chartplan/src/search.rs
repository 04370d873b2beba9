//! Simple-path enumeration over a [`Machine`].
//!
//! The reachable state graph is built breadth-first by firing every event
//! sample at every reachable state. Then every vertex-simple path from the
//! initial state is enumerated depth-first; each path is recorded under the
//! state it ends in, giving one plan per reachable state.

use crate::chart::StateNode;
use crate::guards::Guards;
use crate::hooks::{Event, TestEvents};
use crate::machine::{Machine, StateValue};
use crate::plan::{Segment, TestPath, TestPlan};
use crate::result::PlanResult;
use crate::synthesize::PathPlanner;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// Path planner backed by the built-in [`Machine`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StatechartPlanner;

impl<C> PathPlanner<C> for StatechartPlanner {
    fn simple_path_plans(
        &self,
        chart: &StateNode<C>,
        guards: &Guards,
        events: &TestEvents<C>,
    ) -> PlanResult<Vec<TestPlan<C>>> {
        let machine = Machine::new(chart, guards)?;
        simple_path_plans(&machine, events)
    }
}

/// Reachable states in discovery order and their outgoing edges.
struct Adjacency {
    order: Vec<StateValue>,
    edges: HashMap<StateValue, Vec<(Event, StateValue)>>,
}

fn adjacency<C>(machine: &Machine<C>, samples: &[Event]) -> PlanResult<Adjacency> {
    let initial = machine.initial_value()?;
    let mut order = vec![initial.clone()];
    let mut seen: HashSet<StateValue> = HashSet::from([initial.clone()]);
    let mut queue = VecDeque::from([initial]);
    let mut edges = HashMap::new();

    while let Some(current) = queue.pop_front() {
        let mut outgoing = Vec::with_capacity(samples.len());
        for event in samples {
            let next = machine.transition(&current, event)?;
            if seen.insert(next.clone()) {
                order.push(next.clone());
                queue.push_back(next.clone());
            }
            outgoing.push((event.clone(), next));
        }
        edges.insert(current, outgoing);
    }

    Ok(Adjacency { order, edges })
}

/// Enumerate simple-path plans for `machine`, exploring the events of
/// `events` and replaying with its executors.
pub fn simple_path_plans<C>(machine: &Machine<C>, events: &TestEvents<C>) -> PlanResult<Vec<TestPlan<C>>> {
    let samples = events.samples();
    let graph = adjacency(machine, &samples)?;
    let events = Arc::new(events.clone());

    let mut found: HashMap<StateValue, Vec<Vec<(StateValue, Event)>>> = HashMap::new();
    let mut visited = HashSet::new();
    let mut trail = Vec::new();
    walk(&graph, &graph.order[0], &mut visited, &mut trail, &mut found);

    let plans = graph
        .order
        .iter()
        .filter_map(|value| {
            let walks = found.remove(value)?;
            let paths = walks
                .into_iter()
                .map(|steps| {
                    let segments = steps
                        .into_iter()
                        .map(|(from, event)| Segment {
                            state: machine.state(&from),
                            event,
                        })
                        .collect();
                    TestPath::new(machine.state(value), segments, Arc::clone(&events))
                })
                .collect();
            Some(TestPlan {
                description: value.to_string(),
                state: machine.state(value),
                paths,
            })
        })
        .collect();
    Ok(plans)
}

fn walk(
    graph: &Adjacency,
    current: &StateValue,
    visited: &mut HashSet<StateValue>,
    trail: &mut Vec<(StateValue, Event)>,
    found: &mut HashMap<StateValue, Vec<Vec<(StateValue, Event)>>>,
) {
    visited.insert(current.clone());
    found.entry(current.clone()).or_default().push(trail.clone());

    for (event, next) in graph.edges.get(current).into_iter().flatten() {
        if visited.contains(next) {
            continue;
        }
        trail.push((current.clone(), event.clone()));
        walk(graph, next, visited, trail, found);
        trail.pop();
    }

    visited.remove(current);
}
