//! Plan filter: drops plans and paths by description.
//!
//! Patterns deserialize from either a bare string (exact match) or a
//! `{ regex: "..." }` map (unanchored search):
//!
//! ```yaml
//! skip:
//!   plans: [A]
//!   paths:
//!     - regex: "→ RESET"
//! ```

use crate::plan::TestPlan;
use crate::result::{PlanError, PlanResult};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Exclusion matcher applied to a description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PatternRepr", into = "PatternRepr")]
pub enum Pattern {
    /// Matches one description exactly
    Exact(String),
    /// Matches any description the expression finds a match in
    Regex(Regex),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PatternRepr {
    Exact(String),
    Regex { regex: String },
}

impl TryFrom<PatternRepr> for Pattern {
    type Error = PlanError;

    fn try_from(repr: PatternRepr) -> Result<Self, Self::Error> {
        match repr {
            PatternRepr::Exact(text) => Ok(Self::Exact(text)),
            PatternRepr::Regex { regex } => Self::regex(&regex),
        }
    }
}

impl From<Pattern> for PatternRepr {
    fn from(pattern: Pattern) -> Self {
        match pattern {
            Pattern::Exact(text) => Self::Exact(text),
            Pattern::Regex(regex) => Self::Regex {
                regex: regex.as_str().to_string(),
            },
        }
    }
}

impl Pattern {
    /// Exact-match pattern
    #[must_use]
    pub fn exact(text: impl Into<String>) -> Self {
        Self::Exact(text.into())
    }

    /// Compile a regular expression pattern.
    pub fn regex(expr: &str) -> PlanResult<Self> {
        Regex::new(expr)
            .map(Self::Regex)
            .map_err(|e| PlanError::InvalidPattern {
                pattern: expr.to_string(),
                message: e.to_string(),
            })
    }

    /// Whether `description` is matched.
    #[must_use]
    pub fn matches(&self, description: &str) -> bool {
        match self {
            Self::Exact(text) => text == description,
            Self::Regex(regex) => regex.is_match(description),
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl From<&str> for Pattern {
    fn from(text: &str) -> Self {
        Self::exact(text)
    }
}

/// Plans and paths to leave out of the result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkipConfig {
    /// Matched against plan descriptions
    #[serde(default)]
    pub plans: Vec<Pattern>,
    /// Matched against path descriptions of retained plans
    #[serde(default)]
    pub paths: Vec<Pattern>,
    /// Keep plans whose paths were all skipped
    #[serde(default)]
    pub keep_empty_plans: bool,
}

impl SkipConfig {
    /// Empty config; skips nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip plans matching `pattern`.
    #[must_use]
    pub fn skip_plan(mut self, pattern: impl Into<Pattern>) -> Self {
        self.plans.push(pattern.into());
        self
    }

    /// Skip paths matching `pattern`.
    #[must_use]
    pub fn skip_path(mut self, pattern: impl Into<Pattern>) -> Self {
        self.paths.push(pattern.into());
        self
    }

    /// Keep plans left without paths.
    #[must_use]
    pub const fn with_keep_empty_plans(mut self, keep: bool) -> Self {
        self.keep_empty_plans = keep;
        self
    }

    /// Whether nothing is skipped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty() && self.paths.is_empty()
    }
}

fn matches_any(patterns: &[Pattern], description: &str) -> bool {
    patterns.iter().any(|pattern| pattern.matches(description))
}

/// Apply `skip` to `plans`: plan patterns first, then path patterns inside
/// the retained plans. A plan that loses all of its paths is dropped unless
/// [`SkipConfig::keep_empty_plans`] is set.
#[must_use]
pub fn filter_plans<C>(plans: Vec<TestPlan<C>>, skip: &SkipConfig) -> Vec<TestPlan<C>> {
    plans
        .into_iter()
        .filter(|plan| !matches_any(&skip.plans, &plan.description))
        .filter_map(|mut plan| {
            if skip.paths.is_empty() {
                return Some(plan);
            }
            let before = plan.paths.len();
            plan.paths
                .retain(|path| !matches_any(&skip.paths, &path.description));
            let emptied = before > 0 && plan.paths.is_empty();
            (!emptied || skip.keep_empty_plans).then_some(plan)
        })
        .collect()
}
