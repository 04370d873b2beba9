//! Statechart definition types.
//!
//! A statechart is a tree of [`StateNode`]s. Compound nodes carry child
//! states and an `initial` child; leaves carry none. Transitions are declared
//! per node under `on`, keyed by event type, optionally gated by a named guard
//! (`cond`). Definitions load from YAML or JSON:
//!
//! ```yaml
//! id: door
//! initial: closed
//! states:
//!   closed:
//!     on:
//!       OPEN: { target: open, cond: unlocked }
//!   open:
//!     on:
//!       CLOSE: closed
//! ```

use crate::filter::SkipConfig;
use crate::guards::{Guard, Guards};
use crate::hooks::{EventConfig, StateTest, TestEvent, TestEvents};
use crate::result::{PlanError, PlanResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Node of a statechart.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateNode<C> {
    /// Identifier; only meaningful on the root, used by `#id.path` targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Initial child key of a compound node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
    /// Child states; `None` for a leaf
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<BTreeMap<String, StateNode<C>>>,
    /// Transitions keyed by event type
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub on: BTreeMap<String, TransitionConfig>,
    /// Opaque metadata plus an optional test hook
    #[serde(default, skip_serializing_if = "StateMeta::is_empty")]
    pub meta: StateMeta<C>,
}

impl<C> StateNode<C> {
    /// Create a leaf node.
    #[must_use]
    pub fn leaf() -> Self {
        Self {
            id: None,
            initial: None,
            states: None,
            on: BTreeMap::new(),
            meta: StateMeta::default(),
        }
    }

    /// Create a compound node entering `initial` by default.
    #[must_use]
    pub fn compound(initial: impl Into<String>) -> Self {
        Self {
            initial: Some(initial.into()),
            states: Some(BTreeMap::new()),
            ..Self::leaf()
        }
    }

    /// Set the node identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a child state, turning a leaf into a compound node.
    #[must_use]
    pub fn with_state(mut self, key: impl Into<String>, child: Self) -> Self {
        self.states
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), child);
        self
    }

    /// Declare the transition taken on `event`.
    #[must_use]
    pub fn on(mut self, event: impl Into<String>, transition: impl Into<TransitionConfig>) -> Self {
        self.on.insert(event.into(), transition.into());
        self
    }

    /// Add an opaque metadata entry.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.data.insert(key.into(), value);
        self
    }

    /// Attach a test hook to this node.
    #[must_use]
    pub fn with_test(mut self, test: StateTest<C>) -> Self {
        self.meta.test = Some(test);
        self
    }

    /// Whether the node declares child states.
    #[must_use]
    pub fn is_compound(&self) -> bool {
        self.states.is_some()
    }

    /// Children in key order; empty for leaves.
    pub fn children(&self) -> impl Iterator<Item = (&String, &Self)> {
        self.states.iter().flat_map(BTreeMap::iter)
    }

    /// Child by key
    #[must_use]
    pub fn child(&self, key: &str) -> Option<&Self> {
        self.states.as_ref().and_then(|states| states.get(key))
    }

    /// Every guard name referenced by transitions in this subtree.
    #[must_use]
    pub fn guard_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_guard_names(&mut names);
        names
    }

    fn collect_guard_names(&self, names: &mut BTreeSet<String>) {
        for transition in self.on.values() {
            names.extend(
                transition
                    .candidates()
                    .into_iter()
                    .filter_map(|candidate| candidate.cond),
            );
        }
        for (_, child) in self.children() {
            child.collect_guard_names(names);
        }
    }

    /// Every event type declared in this subtree.
    #[must_use]
    pub fn event_types(&self) -> BTreeSet<String> {
        let mut types: BTreeSet<String> = self.on.keys().cloned().collect();
        for (_, child) in self.children() {
            types.extend(child.event_types());
        }
        types
    }

    /// Number of nodes below this one.
    #[must_use]
    pub fn descendant_count(&self) -> usize {
        self.children()
            .map(|(_, child)| 1 + child.descendant_count())
            .sum()
    }

    /// Parse a definition from YAML.
    pub fn from_yaml(yaml: &str) -> PlanResult<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| PlanError::parse(e.to_string()))
    }

    /// Parse a definition from JSON.
    pub fn from_json(json: &str) -> PlanResult<Self> {
        serde_json::from_str(json).map_err(|e| PlanError::parse(e.to_string()))
    }
}

impl<C> Clone for StateNode<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            initial: self.initial.clone(),
            states: self.states.clone(),
            on: self.on.clone(),
            meta: self.meta.clone(),
        }
    }
}

impl<C> fmt::Debug for StateNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateNode")
            .field("id", &self.id)
            .field("initial", &self.initial)
            .field("states", &self.states)
            .field("on", &self.on)
            .field("meta", &self.meta)
            .finish()
    }
}

/// Node metadata: an opaque bag plus the test hook run during replay.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateMeta<C> {
    /// Caller metadata, preserved untouched
    #[serde(flatten)]
    pub data: BTreeMap<String, Value>,
    /// Test hook
    #[serde(skip)]
    pub test: Option<StateTest<C>>,
}

impl<C> StateMeta<C> {
    /// Whether there is neither data nor a hook.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.test.is_none()
    }
}

impl<C> Default for StateMeta<C> {
    fn default() -> Self {
        Self {
            data: BTreeMap::new(),
            test: None,
        }
    }
}

impl<C> Clone for StateMeta<C> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            test: self.test.clone(),
        }
    }
}

impl<C> fmt::Debug for StateMeta<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMeta")
            .field("data", &self.data)
            .field("test", &self.test.is_some())
            .finish()
    }
}

/// Transition declaration for one event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransitionConfig {
    /// Unguarded transition to a target
    Target(String),
    /// Single candidate
    Single(TransitionDef),
    /// Candidates tried in order; the first whose guard passes is taken
    Candidates(Vec<TransitionDef>),
}

impl TransitionConfig {
    /// Normalized candidate list.
    #[must_use]
    pub fn candidates(&self) -> Vec<TransitionDef> {
        match self {
            Self::Target(target) => vec![TransitionDef::to(target.clone())],
            Self::Single(def) => vec![def.clone()],
            Self::Candidates(defs) => defs.clone(),
        }
    }
}

impl From<&str> for TransitionConfig {
    fn from(target: &str) -> Self {
        Self::Target(target.to_string())
    }
}

impl From<String> for TransitionConfig {
    fn from(target: String) -> Self {
        Self::Target(target)
    }
}

impl From<TransitionDef> for TransitionConfig {
    fn from(def: TransitionDef) -> Self {
        Self::Single(def)
    }
}

impl From<Vec<TransitionDef>> for TransitionConfig {
    fn from(defs: Vec<TransitionDef>) -> Self {
        Self::Candidates(defs)
    }
}

/// A single transition candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDef {
    /// Target state; `None` keeps the current state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Guard name that must pass for the transition to fire
    #[serde(default, alias = "guard", skip_serializing_if = "Option::is_none")]
    pub cond: Option<String>,
}

impl TransitionDef {
    /// Unguarded transition to `target`.
    #[must_use]
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            cond: None,
        }
    }

    /// Gate this transition behind `guard`.
    #[must_use]
    pub fn when(mut self, guard: impl Into<String>) -> Self {
        self.cond = Some(guard.into());
        self
    }
}

/// Machine options supplied alongside the definition.
#[derive(Debug, Clone, Default)]
pub struct MachineOptions {
    /// Named guard implementations
    pub guards: Guards,
}

/// A statechart definition together with its guard implementations.
#[derive(Debug)]
pub struct MachineDefinition<C> {
    /// Statechart definition
    pub config: StateNode<C>,
    /// Guard implementations
    pub options: MachineOptions,
}

impl<C> MachineDefinition<C> {
    /// Machine without guards.
    #[must_use]
    pub fn new(config: StateNode<C>) -> Self {
        Self {
            config,
            options: MachineOptions::default(),
        }
    }

    /// Add a guard implementation.
    #[must_use]
    pub fn with_guard(mut self, name: impl Into<String>, guard: Guard) -> Self {
        self.options.guards.insert(name, guard);
        self
    }
}

impl<C> Clone for MachineDefinition<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            options: self.options.clone(),
        }
    }
}

/// Event declaration in a chart file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventSpec {
    /// Payload samples
    #[serde(default)]
    pub cases: Vec<Map<String, Value>>,
}

/// Self-contained statechart document consumed by the CLI.
///
/// Guards are constants here since a document cannot carry code; events have
/// no executors and replay as logged no-ops.
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ChartFile<C> {
    /// Statechart definition
    pub machine: StateNode<C>,
    /// Guard name to default value
    #[serde(default)]
    pub guards: BTreeMap<String, bool>,
    /// Event types to exercise
    #[serde(default)]
    pub events: BTreeMap<String, Option<EventSpec>>,
    /// Plans and paths to leave out
    #[serde(default)]
    pub skip: Option<SkipConfig>,
}

impl<C> ChartFile<C> {
    /// Parse a chart file from YAML (a superset of JSON).
    pub fn from_yaml(yaml: &str) -> PlanResult<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| PlanError::parse(e.to_string()))
    }

    /// Parse a chart file from JSON.
    pub fn from_json(json: &str) -> PlanResult<Self> {
        serde_json::from_str(json).map_err(|e| PlanError::parse(e.to_string()))
    }

    /// Machine definition with constant guards.
    #[must_use]
    pub fn machine_definition(&self) -> MachineDefinition<C> {
        let guards = self
            .guards
            .iter()
            .map(|(name, value)| (name.clone(), Guard::constant(*value)))
            .collect();
        MachineDefinition {
            config: self.machine.clone(),
            options: MachineOptions { guards },
        }
    }

    /// Event map with no executors, preserving cases.
    #[must_use]
    pub fn test_events(&self) -> TestEvents<C> {
        self.events
            .iter()
            .map(|(event_type, spec)| {
                let config = EventConfig {
                    exec: None,
                    cases: spec.as_ref().map(|s| s.cases.clone()).unwrap_or_default(),
                };
                (event_type.clone(), TestEvent::Config(config))
            })
            .collect()
    }
}
