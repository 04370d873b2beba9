//! Test plans, paths and their structural signatures.

use crate::hooks::{Event, TestEvents};
use crate::machine::State;
use crate::result::ReplayError;
use std::fmt;
use std::sync::Arc;

/// Separator between signature parts.
pub const ARROW: &str = " → ";

/// One step of a path: the state the machine was in and the event fired.
pub struct Segment<C> {
    /// State before the event
    pub state: State<C>,
    /// Event fired from that state
    pub event: Event,
}

impl<C> Clone for Segment<C> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            event: self.event.clone(),
        }
    }
}

impl<C> fmt::Debug for Segment<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Segment")
            .field("state", &self.state.value)
            .field("event", &self.event.event_type)
            .finish()
    }
}

/// Signature of a segment list: state value and event type of every
/// segment, joined by [`ARROW`]. Two paths are equivalent iff their
/// signatures are identical.
#[must_use]
pub fn path_signature<C>(segments: &[Segment<C>]) -> String {
    segments
        .iter()
        .flat_map(|segment| [segment.state.value.to_string(), segment.event.event_type.clone()])
        .collect::<Vec<_>>()
        .join(ARROW)
}

/// Replayable path from the initial state to [`TestPath::state`].
pub struct TestPath<C> {
    /// Terminal state
    pub state: State<C>,
    /// Steps in order; empty for the initial state
    pub segments: Vec<Segment<C>>,
    /// Human-readable description
    pub description: String,
    events: Arc<TestEvents<C>>,
}

impl<C> TestPath<C> {
    /// Path replaying `segments` with executors from `events`.
    #[must_use]
    pub fn new(state: State<C>, segments: Vec<Segment<C>>, events: Arc<TestEvents<C>>) -> Self {
        let description = format!(
            "via {}",
            segments
                .iter()
                .map(|segment| segment.event.event_type.as_str())
                .collect::<Vec<_>>()
                .join(ARROW)
        );
        Self {
            state,
            segments,
            description,
            events,
        }
    }

    /// Structural signature; see [`path_signature`].
    #[must_use]
    pub fn signature(&self) -> String {
        path_signature(&self.segments)
    }

    /// Number of events fired.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the path stays in the initial state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Replace the description with the signature.
    pub fn derive_description(&mut self) {
        self.description = self.signature();
    }

    /// Replay the path: test each state, fire its event, then test the
    /// terminal state. The first failure aborts the replay.
    pub async fn test(&self, ctx: &mut C) -> Result<(), ReplayError> {
        for segment in &self.segments {
            segment.state.test(ctx).await?;
            self.execute(&segment.event, ctx).await?;
        }
        self.state.test(ctx).await
    }

    async fn execute(&self, event: &Event, ctx: &mut C) -> Result<(), ReplayError> {
        let Some(exec) = self.events.executor(&event.event_type) else {
            return Ok(());
        };
        exec.call(ctx, event)
            .await
            .map_err(|source| ReplayError::Event {
                event: event.event_type.clone(),
                source,
            })
    }
}

impl<C> Clone for TestPath<C> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            segments: self.segments.clone(),
            description: self.description.clone(),
            events: Arc::clone(&self.events),
        }
    }
}

impl<C> fmt::Debug for TestPath<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestPath")
            .field("state", &self.state.value)
            .field("segments", &self.segments)
            .field("description", &self.description)
            .finish()
    }
}

/// Paths grouped under one description, typically one terminal state.
pub struct TestPlan<C> {
    /// Plan description
    pub description: String,
    /// Terminal state shared by the paths
    pub state: State<C>,
    /// Paths in discovery order
    pub paths: Vec<TestPath<C>>,
}

impl<C> TestPlan<C> {
    /// Replay every path against a fresh context from `setup`.
    pub async fn test<F>(&self, mut setup: F) -> Result<(), ReplayError>
    where
        F: FnMut() -> C,
    {
        for path in &self.paths {
            let mut ctx = setup();
            path.test(&mut ctx).await?;
        }
        Ok(())
    }

    /// Path signatures in order.
    #[must_use]
    pub fn signatures(&self) -> Vec<String> {
        self.paths.iter().map(TestPath::signature).collect()
    }
}

impl<C> Clone for TestPlan<C> {
    fn clone(&self) -> Self {
        Self {
            description: self.description.clone(),
            state: self.state.clone(),
            paths: self.paths.clone(),
        }
    }
}

impl<C> fmt::Debug for TestPlan<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestPlan")
            .field("description", &self.description)
            .field("paths", &self.paths)
            .finish()
    }
}
