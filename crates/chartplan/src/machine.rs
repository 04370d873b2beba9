//! Executable machine built from a statechart and guard implementations.
//!
//! Supports hierarchical compound/leaf states with an initial child per
//! compound state and guarded transitions. An event is offered to the active
//! leaf first and bubbles to its ancestors until some node has an enabled
//! transition for it. Parallel regions and history are not modelled.

use crate::chart::StateNode;
use crate::guards::Guards;
use crate::hooks::{Event, StateTest};
use crate::result::{PlanError, PlanResult, ReplayError};
use serde::{Serialize, Serializer};
use std::fmt;

/// Active configuration as the key path from the root to the active leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StateValue(Vec<String>);

impl StateValue {
    /// Value from a key path.
    #[must_use]
    pub fn new(path: Vec<String>) -> Self {
        Self(path)
    }

    /// Keys from the root's child down to the active leaf.
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.0
    }

    /// Whether this value is `other` or lies inside it, e.g. `door.open`
    /// matches `door`.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        let parts: Vec<&str> = other.split('.').collect();
        parts.len() <= self.0.len() && self.0.iter().zip(&parts).all(|(a, b)| a == b)
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl Serialize for StateValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        Self(value.split('.').map(str::to_string).collect())
    }
}

/// Snapshot of the machine handed to state tests.
pub struct State<C> {
    /// Active configuration
    pub value: StateValue,
    tests: Vec<StateTest<C>>,
}

impl<C> State<C> {
    /// Whether the active configuration is `path` or inside it.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.value.matches(path)
    }

    /// Number of test hooks along the active configuration.
    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.tests.len()
    }

    /// Run the test hooks of every active node, root first.
    pub async fn test(&self, ctx: &mut C) -> Result<(), ReplayError> {
        for test in &self.tests {
            test.call(ctx, self)
                .await
                .map_err(|source| ReplayError::StateTest {
                    state: self.value.to_string(),
                    source,
                })?;
        }
        Ok(())
    }
}

impl<C> Clone for State<C> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            tests: self.tests.clone(),
        }
    }
}

impl<C> fmt::Debug for State<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("value", &self.value)
            .field("hooks", &self.tests.len())
            .finish()
    }
}

/// Executable machine.
pub struct Machine<C> {
    root: StateNode<C>,
    guards: Guards,
}

impl<C> fmt::Debug for Machine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("id", &self.root.id)
            .field("guards", &self.guards)
            .finish()
    }
}

impl<C> Machine<C> {
    /// Build a machine, checking initial children, transition targets and
    /// guard references up front.
    pub fn new(chart: &StateNode<C>, guards: &Guards) -> PlanResult<Self> {
        let machine = Self {
            root: chart.clone(),
            guards: guards.clone(),
        };
        machine.validate(&machine.root, &mut Vec::new())?;
        Ok(machine)
    }

    fn validate(&self, node: &StateNode<C>, path: &mut Vec<String>) -> PlanResult<()> {
        if has_children(node) {
            let initial = node.initial.clone().unwrap_or_default();
            if node.child(&initial).is_none() {
                return Err(PlanError::InvalidInitial {
                    state: display_path(path),
                    initial,
                });
            }
        }
        for (event, transition) in &node.on {
            for candidate in transition.candidates() {
                if let Some(cond) = &candidate.cond {
                    if self.guards.get(cond).is_none() {
                        return Err(PlanError::UnknownGuard {
                            guard: cond.clone(),
                            state: display_path(path),
                            event: event.clone(),
                        });
                    }
                }
                if let Some(target) = &candidate.target {
                    self.resolve(path, target)
                        .ok_or_else(|| PlanError::UnknownTarget {
                            state: display_path(path),
                            event: event.clone(),
                            target: target.clone(),
                        })?;
                }
            }
        }
        for (key, child) in node.children() {
            path.push(key.clone());
            self.validate(child, path)?;
            path.pop();
        }
        Ok(())
    }

    /// Node at `path` below the root.
    fn node(&self, path: &[String]) -> Option<&StateNode<C>> {
        path.iter()
            .try_fold(&self.root, |node, key| node.child(key))
    }

    /// Resolve `target` declared on the node at `source`.
    ///
    /// `#id.a.b` is absolute, `.a` is a child of the source, anything else is
    /// looked up among the source's siblings, then its ancestors' siblings.
    fn resolve(&self, source: &[String], target: &str) -> Option<Vec<String>> {
        if let Some(absolute) = target.strip_prefix('#') {
            let mut parts: Vec<String> = absolute.split('.').map(str::to_string).collect();
            if self.root.id.as_deref() == parts.first().map(String::as_str) {
                parts.remove(0);
            }
            return self.node(&parts).map(|_| parts);
        }
        if let Some(relative) = target.strip_prefix('.') {
            let mut path = source.to_vec();
            path.extend(relative.split('.').map(str::to_string));
            return self.node(&path).map(|_| path);
        }
        let parts: Vec<String> = target.split('.').map(str::to_string).collect();
        (0..source.len().max(1)).rev().find_map(|depth| {
            let mut path = source[..depth].to_vec();
            path.extend(parts.iter().cloned());
            self.node(&path).map(|_| path)
        })
    }

    /// Follow initial children from `path` down to a leaf.
    fn enter(&self, mut path: Vec<String>) -> PlanResult<StateValue> {
        loop {
            let node = self.node(&path).ok_or_else(|| PlanError::InvalidInitial {
                state: display_path(&path),
                initial: String::new(),
            })?;
            if !has_children(node) {
                return Ok(StateValue(path));
            }
            let initial = node.initial.clone().unwrap_or_default();
            if node.child(&initial).is_none() {
                return Err(PlanError::InvalidInitial {
                    state: display_path(&path),
                    initial,
                });
            }
            path.push(initial);
        }
    }

    /// Initial configuration.
    pub fn initial_value(&self) -> PlanResult<StateValue> {
        self.enter(Vec::new())
    }

    /// Configuration reached from `value` on `event`; unchanged when no
    /// enabled transition handles the event.
    pub fn transition(&self, value: &StateValue, event: &Event) -> PlanResult<StateValue> {
        for depth in (0..=value.0.len()).rev() {
            let source = &value.0[..depth];
            let Some(node) = self.node(source) else {
                continue;
            };
            let Some(transition) = node.on.get(&event.event_type) else {
                continue;
            };
            for candidate in transition.candidates() {
                if let Some(cond) = &candidate.cond {
                    let guard = self.guards.get(cond).ok_or_else(|| PlanError::UnknownGuard {
                        guard: cond.clone(),
                        state: display_path(source),
                        event: event.event_type.clone(),
                    })?;
                    if !guard.check(event) {
                        continue;
                    }
                }
                let Some(target) = &candidate.target else {
                    return Ok(value.clone());
                };
                let path = self
                    .resolve(source, target)
                    .ok_or_else(|| PlanError::UnknownTarget {
                        state: display_path(source),
                        event: event.event_type.clone(),
                        target: target.clone(),
                    })?;
                return self.enter(path);
            }
        }
        Ok(value.clone())
    }

    /// Snapshot for `value`, carrying the test hooks of every active node.
    #[must_use]
    pub fn state(&self, value: &StateValue) -> State<C> {
        let mut tests = Vec::new();
        let mut node = Some(&self.root);
        let mut keys = value.0.iter();
        while let Some(current) = node {
            tests.extend(current.meta.test.clone());
            node = keys.next().and_then(|key| current.child(key));
        }
        State {
            value: value.clone(),
            tests,
        }
    }

    /// Number of states below the root.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.root.descendant_count()
    }
}

fn has_children<C>(node: &StateNode<C>) -> bool {
    node.children().next().is_some()
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "(root)".to_string()
    } else {
        path.join(".")
    }
}
