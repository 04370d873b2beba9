//! Level-gated logging.
//!
//! A [`Logger`] is an ordinary value: a configured [`LogLevel`] plus a sink.
//! Every component that reports progress receives a clone, so two synthesis
//! calls with different levels never interfere.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Verbosity of emitted diagnostics.
///
/// Levels are cumulative: `Trace` includes `Debug`, which includes `Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Emit nothing
    #[default]
    None,
    /// Final plan report
    Info,
    /// Visited states and fired events during replay
    Debug,
    /// Synthesis internals (guard combinations, plan counts)
    Trace,
}

impl LogLevel {
    /// All levels, quietest first.
    pub const ALL: [Self; 4] = [Self::None, Self::Info, Self::Debug, Self::Trace];

    /// Whether an entry logged at `given` is surfaced under this configuration.
    #[must_use]
    pub fn allows(self, given: Self) -> bool {
        given != Self::None && given <= self
    }

    /// Upper-case label used as the line prefix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown log level '{s}' (none, info, debug, trace)"))
    }
}

/// Destination for log entries that passed the level gate.
pub type LogSink = Arc<dyn Fn(LogLevel, &str) + Send + Sync>;

/// Level-gated logger handed to every component.
#[derive(Clone)]
pub struct Logger {
    level: LogLevel,
    sink: LogSink,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("level", &self.level).finish()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::None)
    }
}

impl Logger {
    /// Create a logger that forwards to `tracing` under the `chartplan` target.
    #[must_use]
    pub fn new(level: LogLevel) -> Self {
        Self::with_sink(level, Arc::new(tracing_sink))
    }

    /// Create a logger with a custom sink.
    #[must_use]
    pub fn with_sink(level: LogLevel, sink: LogSink) -> Self {
        Self { level, sink }
    }

    /// Whether `given` would be surfaced.
    #[must_use]
    pub fn enabled(&self, given: LogLevel) -> bool {
        self.level.allows(given)
    }

    /// Log `message` at `given`. Empty messages are dropped.
    pub fn log(&self, given: LogLevel, message: &str) {
        if self.enabled(given) && !message.is_empty() {
            (self.sink)(given, message);
        }
    }

    /// Log at `Info`
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log at `Debug`
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Log at `Trace`
    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message);
    }
}

fn tracing_sink(level: LogLevel, message: &str) {
    match level {
        LogLevel::None => {}
        LogLevel::Info => tracing::info!(target: "chartplan", "[{level}] {message}"),
        LogLevel::Debug => tracing::debug!(target: "chartplan", "[{level}] {message}"),
        LogLevel::Trace => tracing::trace!(target: "chartplan", "[{level}] {message}"),
    }
}

/// In-memory sink for tests.
#[cfg(test)]
pub(crate) fn capture(level: LogLevel) -> (Logger, Arc<std::sync::Mutex<Vec<(LogLevel, String)>>>) {
    let lines = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink_lines = Arc::clone(&lines);
    let logger = Logger::with_sink(
        level,
        Arc::new(move |given, message: &str| {
            if let Ok(mut lines) = sink_lines.lock() {
                lines.push((given, message.to_string()));
            }
        }),
    );
    (logger, lines)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_cumulative() {
        assert!(!LogLevel::None.allows(LogLevel::Info));
        assert!(LogLevel::Info.allows(LogLevel::Info));
        assert!(!LogLevel::Info.allows(LogLevel::Debug));
        assert!(LogLevel::Debug.allows(LogLevel::Info));
        assert!(LogLevel::Debug.allows(LogLevel::Debug));
        assert!(!LogLevel::Debug.allows(LogLevel::Trace));
        assert!(LogLevel::Trace.allows(LogLevel::Info));
        assert!(LogLevel::Trace.allows(LogLevel::Trace));
    }

    #[test]
    fn test_none_entries_never_surface() {
        for level in LogLevel::ALL {
            assert!(!level.allows(LogLevel::None));
        }
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("TRACE".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_logger_gates_by_level() {
        let (logger, lines) = capture(LogLevel::Info);
        logger.info("report");
        logger.debug("    A");
        logger.trace("internals");

        let lines = lines.lock().unwrap();
        assert_eq!(lines.as_slice(), &[(LogLevel::Info, "report".to_string())]);
    }

    #[test]
    fn test_logger_drops_empty_messages() {
        let (logger, lines) = capture(LogLevel::Trace);
        logger.info("");
        assert!(lines.lock().unwrap().is_empty());
    }

    #[test]
    fn test_serde_lowercase() {
        let level: LogLevel = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(level, LogLevel::Debug);
        assert_eq!(serde_json::to_string(&LogLevel::Info).unwrap(), "\"info\"");
    }
}
