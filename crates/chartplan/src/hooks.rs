//! Caller-supplied callbacks: per-state tests and per-event executors.
//!
//! Both kinds of callback receive the caller's test context mutably and
//! return a boxed future, so they may await arbitrary work during replay.
//! A map slot holds either a leaf callback or a nested structure; the two
//! are distinct enum variants rather than something probed at runtime.

use crate::machine::State;
use crate::result::HookResult;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Future returned by state tests and event executors.
pub type HookFuture<'a> = BoxFuture<'a, HookResult>;

type StateTestFn<C> = dyn for<'a> Fn(&'a mut C, &'a State<C>) -> HookFuture<'a> + Send + Sync;
type EventExecFn<C> = dyn for<'a> Fn(&'a mut C, &'a Event) -> HookFuture<'a> + Send + Sync;

/// An event fired at the machine: a type plus an optional payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Event type, e.g. `GO`
    #[serde(rename = "type")]
    pub event_type: String,
    /// Extra payload fields
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Event {
    /// Create an event without payload.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            payload: Map::new(),
        }
    }

    /// Create an event carrying `payload`.
    #[must_use]
    pub fn with_payload(event_type: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.payload.is_empty() {
            f.write_str(&self.event_type)
        } else {
            write!(f, "{} {}", self.event_type, Value::Object(self.payload.clone()))
        }
    }
}

/// Verification callback run when a path visits a state.
pub struct StateTest<C>(Arc<StateTestFn<C>>);

impl<C> StateTest<C> {
    /// Wrap an async callback.
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut C, &'a State<C>) -> HookFuture<'a> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wrap a synchronous callback.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&mut C, &State<C>) -> HookResult + Send + Sync + 'static,
    {
        Self::new(move |ctx, state| Box::pin(futures::future::ready(f(ctx, state))))
    }

    /// Invoke the callback.
    pub fn call<'a>(&self, ctx: &'a mut C, state: &'a State<C>) -> HookFuture<'a> {
        (self.0)(ctx, state)
    }
}

impl<C> Clone for StateTest<C> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<C> fmt::Debug for StateTest<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StateTest(..)")
    }
}

/// Callback that drives the system under test through one event.
pub struct EventExecutor<C>(Arc<EventExecFn<C>>);

impl<C> EventExecutor<C> {
    /// Wrap an async executor.
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut C, &'a Event) -> HookFuture<'a> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wrap a synchronous executor.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&mut C, &Event) -> HookResult + Send + Sync + 'static,
    {
        Self::new(move |ctx, event| Box::pin(futures::future::ready(f(ctx, event))))
    }

    /// Invoke the executor.
    pub fn call<'a>(&self, ctx: &'a mut C, event: &'a Event) -> HookFuture<'a> {
        (self.0)(ctx, event)
    }
}

impl<C> Clone for EventExecutor<C> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<C> fmt::Debug for EventExecutor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventExecutor(..)")
    }
}

/// One slot of a [`StateTests`] map.
pub enum TestFunction<C> {
    /// Test for a leaf state
    Leaf(StateTest<C>),
    /// Tests for the children of a compound state
    Nested(StateTests<C>),
}

impl<C> Clone for TestFunction<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(test) => Self::Leaf(test.clone()),
            Self::Nested(tests) => Self::Nested(tests.clone()),
        }
    }
}

impl<C> fmt::Debug for TestFunction<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(_) => f.write_str("Leaf(..)"),
            Self::Nested(tests) => f.debug_tuple("Nested").field(tests).finish(),
        }
    }
}

/// Tree-shaped map from state key to test, mirroring the statechart.
pub struct StateTests<C> {
    entries: BTreeMap<String, TestFunction<C>>,
}

impl<C> StateTests<C> {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add an async test for the leaf state `key`.
    pub fn with_test<F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut C, &'a State<C>) -> HookFuture<'a> + Send + Sync + 'static,
    {
        self.entries
            .insert(key.into(), TestFunction::Leaf(StateTest::new(f)));
        self
    }

    /// Add a synchronous test for the leaf state `key`.
    pub fn with_sync_test<F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut C, &State<C>) -> HookResult + Send + Sync + 'static,
    {
        self.entries
            .insert(key.into(), TestFunction::Leaf(StateTest::sync(f)));
        self
    }

    /// Add tests for the children of compound state `key`.
    pub fn with_nested(mut self, key: impl Into<String>, nested: Self) -> Self {
        self.entries.insert(key.into(), TestFunction::Nested(nested));
        self
    }

    /// Insert a slot, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, slot: TestFunction<C>) -> Option<TestFunction<C>> {
        self.entries.insert(key.into(), slot)
    }

    /// Slot for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TestFunction<C>> {
        self.entries.get(key)
    }

    /// Number of top-level slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no slot is defined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate slots in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TestFunction<C>)> {
        self.entries.iter()
    }
}

impl<C> Default for StateTests<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for StateTests<C> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<C> fmt::Debug for StateTests<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// Executor plus passthrough configuration for one event type.
pub struct EventConfig<C> {
    /// Executor; a missing one replays as a no-op
    pub exec: Option<EventExecutor<C>>,
    /// Payload samples; each case is fired as its own event
    pub cases: Vec<Map<String, Value>>,
}

impl<C> EventConfig<C> {
    /// Config with an executor and no cases.
    #[must_use]
    pub fn new(exec: EventExecutor<C>) -> Self {
        Self {
            exec: Some(exec),
            cases: Vec::new(),
        }
    }

    /// Config without an executor.
    #[must_use]
    pub fn without_exec() -> Self {
        Self {
            exec: None,
            cases: Vec::new(),
        }
    }

    /// Add a payload case.
    #[must_use]
    pub fn with_case(mut self, case: Map<String, Value>) -> Self {
        self.cases.push(case);
        self
    }
}

impl<C> Clone for EventConfig<C> {
    fn clone(&self) -> Self {
        Self {
            exec: self.exec.clone(),
            cases: self.cases.clone(),
        }
    }
}

impl<C> fmt::Debug for EventConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventConfig")
            .field("exec", &self.exec)
            .field("cases", &self.cases)
            .finish()
    }
}

/// One slot of a [`TestEvents`] map.
pub enum TestEvent<C> {
    /// Bare executor
    Exec(EventExecutor<C>),
    /// Executor with passthrough configuration
    Config(EventConfig<C>),
}

impl<C> TestEvent<C> {
    /// The executor, wherever it lives.
    #[must_use]
    pub fn executor(&self) -> Option<&EventExecutor<C>> {
        match self {
            Self::Exec(exec) => Some(exec),
            Self::Config(config) => config.exec.as_ref(),
        }
    }

    /// Payload cases; empty for bare executors.
    #[must_use]
    pub fn cases(&self) -> &[Map<String, Value>] {
        match self {
            Self::Exec(_) => &[],
            Self::Config(config) => &config.cases,
        }
    }
}

impl<C> Clone for TestEvent<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Exec(exec) => Self::Exec(exec.clone()),
            Self::Config(config) => Self::Config(config.clone()),
        }
    }
}

impl<C> fmt::Debug for TestEvent<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exec(exec) => f.debug_tuple("Exec").field(exec).finish(),
            Self::Config(config) => f.debug_tuple("Config").field(config).finish(),
        }
    }
}

/// Map from event type to the executor that performs it.
///
/// Only event types present here are explored by path search.
pub struct TestEvents<C> {
    entries: BTreeMap<String, TestEvent<C>>,
}

impl<C> TestEvents<C> {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add an async executor for `event_type`.
    pub fn with_exec<F>(mut self, event_type: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut C, &'a Event) -> HookFuture<'a> + Send + Sync + 'static,
    {
        self.entries
            .insert(event_type.into(), TestEvent::Exec(EventExecutor::new(f)));
        self
    }

    /// Add a synchronous executor for `event_type`.
    pub fn with_sync_exec<F>(mut self, event_type: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut C, &Event) -> HookResult + Send + Sync + 'static,
    {
        self.entries
            .insert(event_type.into(), TestEvent::Exec(EventExecutor::sync(f)));
        self
    }

    /// Add a configured event.
    pub fn with_config(mut self, event_type: impl Into<String>, config: EventConfig<C>) -> Self {
        self.entries
            .insert(event_type.into(), TestEvent::Config(config));
        self
    }

    /// Insert a slot, returning the previous one.
    pub fn insert(&mut self, event_type: impl Into<String>, event: TestEvent<C>) -> Option<TestEvent<C>> {
        self.entries.insert(event_type.into(), event)
    }

    /// Slot for `event_type`
    #[must_use]
    pub fn get(&self, event_type: &str) -> Option<&TestEvent<C>> {
        self.entries.get(event_type)
    }

    /// Executor for `event_type`, if any.
    #[must_use]
    pub fn executor(&self, event_type: &str) -> Option<&EventExecutor<C>> {
        self.get(event_type).and_then(TestEvent::executor)
    }

    /// Number of event types
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no event type is defined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate slots in event-type order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TestEvent<C>)> {
        self.entries.iter()
    }

    /// Concrete events to fire during exploration: one per case, or a bare
    /// event when no cases are configured.
    #[must_use]
    pub fn samples(&self) -> Vec<Event> {
        self.entries
            .iter()
            .flat_map(|(event_type, event)| {
                if event.cases().is_empty() {
                    vec![Event::new(event_type.clone())]
                } else {
                    event
                        .cases()
                        .iter()
                        .map(|case| Event::with_payload(event_type.clone(), case.clone()))
                        .collect()
                }
            })
            .collect()
    }
}

impl<C> Default for TestEvents<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for TestEvents<C> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<C> fmt::Debug for TestEvents<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<C> FromIterator<(String, TestEvent<C>)> for TestEvents<C> {
    fn from_iter<I: IntoIterator<Item = (String, TestEvent<C>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
