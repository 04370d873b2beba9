//! Result and error types for chartplan.

use thiserror::Error;

/// Result type for chartplan operations
pub type PlanResult<T> = Result<T, PlanError>;

/// Error returned by a user-supplied state test or event executor.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of a user-supplied state test or event executor.
pub type HookResult = Result<(), HookError>;

/// Errors that can occur while building machines and synthesizing plans
#[derive(Debug, Error)]
pub enum PlanError {
    /// Statechart file could not be parsed
    #[error("Failed to parse statechart: {message}")]
    Parse {
        /// Error message
        message: String,
    },

    /// Compound state has no usable initial child
    #[error("State '{state}' has no initial child '{initial}'")]
    InvalidInitial {
        /// Compound state path
        state: String,
        /// Declared (or missing) initial key
        initial: String,
    },

    /// Transition target does not resolve to a state
    #[error("Transition '{event}' on '{state}' targets unknown state '{target}'")]
    UnknownTarget {
        /// Source state path
        state: String,
        /// Event type
        event: String,
        /// Unresolved target
        target: String,
    },

    /// Transition references a guard missing from the guard map
    #[error("Guard '{guard}' used by '{event}' on '{state}' is not implemented")]
    UnknownGuard {
        /// Guard name
        guard: String,
        /// Source state path
        state: String,
        /// Event type
        event: String,
    },

    /// Too many guards to enumerate every combination
    #[error("{count} guards would produce 2^{count} combinations (limit {limit})")]
    GuardLimitExceeded {
        /// Number of guards to vary
        count: usize,
        /// Configured maximum
        limit: usize,
    },

    /// Skip pattern is not a valid regular expression
    #[error("Invalid skip pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Pattern source
        pattern: String,
        /// Regex compiler message
        message: String,
    },
}

impl PlanError {
    /// Create a parse error
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}

/// Failure raised while replaying a path against the system under test.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// A state test returned an error
    #[error("State test for '{state}' failed: {source}")]
    StateTest {
        /// State value being verified
        state: String,
        /// Error raised by the test
        #[source]
        source: HookError,
    },

    /// An event executor returned an error
    #[error("Executing event '{event}' failed: {source}")]
    Event {
        /// Event type being executed
        event: String,
        /// Error raised by the executor
        #[source]
        source: HookError,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_parse_error_display() {
        let err = PlanError::parse("bad yaml");
        assert_eq!(err.to_string(), "Failed to parse statechart: bad yaml");
    }

    #[test]
    fn test_guard_limit_display() {
        let err = PlanError::GuardLimitExceeded {
            count: 20,
            limit: 16,
        };
        assert!(err.to_string().contains("2^20"));
        assert!(err.to_string().contains("limit 16"));
    }

    #[test]
    fn test_replay_error_keeps_source() {
        let err = ReplayError::Event {
            event: "GO".to_string(),
            source: "door jammed".into(),
        };
        assert!(err.to_string().contains("GO"));
        assert_eq!(err.source().unwrap().to_string(), "door jammed");
    }
}
