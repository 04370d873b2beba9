//! Options for [`create_test_plans`](crate::create_test_plans).

use crate::filter::SkipConfig;
use crate::guards::DEFAULT_MAX_GUARDS;
use crate::logger::{LogLevel, LogSink, Logger};
use std::collections::BTreeSet;
use std::fmt;

/// Synthesis options.
#[derive(Clone)]
pub struct PlanOptions {
    /// Diagnostics verbosity; never affects the returned plans
    pub log_level: LogLevel,
    /// Plans and paths to leave out
    pub skip: SkipConfig,
    /// Most guards varied together before synthesis is refused
    pub max_guards: usize,
    /// Guards to vary; `None` varies every guard
    pub vary_guards: Option<BTreeSet<String>>,
    /// Custom log destination; defaults to `tracing`
    pub log_sink: Option<LogSink>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            log_level: LogLevel::None,
            skip: SkipConfig::default(),
            max_guards: DEFAULT_MAX_GUARDS,
            vary_guards: None,
            log_sink: None,
        }
    }
}

impl fmt::Debug for PlanOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanOptions")
            .field("log_level", &self.log_level)
            .field("skip", &self.skip)
            .field("max_guards", &self.max_guards)
            .field("vary_guards", &self.vary_guards)
            .field("log_sink", &self.log_sink.as_ref().map(|_| ".."))
            .finish()
    }
}

impl PlanOptions {
    /// Create default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set log level
    #[must_use]
    pub const fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Set skip configuration
    #[must_use]
    pub fn with_skip(mut self, skip: SkipConfig) -> Self {
        self.skip = skip;
        self
    }

    /// Set the guard limit
    #[must_use]
    pub const fn with_max_guards(mut self, max: usize) -> Self {
        self.max_guards = max;
        self
    }

    /// Vary only the named guards
    #[must_use]
    pub fn with_vary_guards<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vary_guards = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Send log entries to `sink` instead of `tracing`
    #[must_use]
    pub fn with_log_sink(mut self, sink: LogSink) -> Self {
        self.log_sink = Some(sink);
        self
    }

    /// Logger for one synthesis call.
    #[must_use]
    pub fn logger(&self) -> Logger {
        match &self.log_sink {
            Some(sink) => Logger::with_sink(self.log_level, sink.clone()),
            None => Logger::new(self.log_level),
        }
    }
}
