//! Guard implementations and exhaustive guard combinations.
//!
//! Every named guard is forced to each truth value so that every
//! conditional branch of the chart gets explored. Assignment `i` fixes
//! guard `j` (in name order) to bit `j` of `i`, giving `2^G` assignments.
//! Nothing prunes unreachable combinations, so keep `G` small.

use crate::hooks::Event;
use crate::result::{PlanError, PlanResult};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Upper bound on guards varied together unless configured otherwise.
pub const DEFAULT_MAX_GUARDS: usize = 16;

/// Hard ceiling. Assignments are indexed by a `usize` bitmask, so the shift
/// must stay below the pointer width.
pub const BITMASK_LIMIT: usize = if usize::BITS > 32 {
    32
} else {
    usize::BITS as usize - 1
};

/// Boolean condition gating a transition.
#[derive(Clone)]
pub struct Guard(Arc<dyn Fn(&Event) -> bool + Send + Sync>);

impl Guard {
    /// Guard evaluated against the triggering event.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Guard that always returns `value`.
    #[must_use]
    pub fn constant(value: bool) -> Self {
        Self::new(move |_| value)
    }

    /// Evaluate the guard.
    #[must_use]
    pub fn check(&self, event: &Event) -> bool {
        (self.0)(event)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}

/// Named guard implementations.
#[derive(Debug, Clone, Default)]
pub struct Guards {
    entries: BTreeMap<String, Guard>,
}

impl Guards {
    /// Empty guard map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a guard.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, guard: Guard) -> Self {
        self.insert(name, guard);
        self
    }

    /// Insert a guard, replacing any previous implementation.
    pub fn insert(&mut self, name: impl Into<String>, guard: Guard) {
        self.entries.insert(name.into(), guard);
    }

    /// Guard by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Guard> {
        self.entries.get(name)
    }

    /// Guard names in bit order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Number of guards
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no guards
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Guard)> for Guards {
    fn from_iter<I: IntoIterator<Item = (String, Guard)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// One truth assignment over the varied guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardAssignment {
    index: usize,
    values: BTreeMap<String, bool>,
}

impl GuardAssignment {
    /// Position in enumeration order; also the bitmask of the values.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Fixed value per guard name.
    #[must_use]
    pub const fn values(&self) -> &BTreeMap<String, bool> {
        &self.values
    }

    /// Value fixed for `name`, if it is varied.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<bool> {
        self.values.get(name).copied()
    }

    /// Constant predicates for the varied guards only.
    #[must_use]
    pub fn guards(&self) -> Guards {
        self.values
            .iter()
            .map(|(name, value)| (name.clone(), Guard::constant(*value)))
            .collect()
    }

    /// `base` with every varied guard replaced by its constant.
    #[must_use]
    pub fn apply(&self, base: &Guards) -> Guards {
        let mut guards = base.clone();
        for (name, value) in &self.values {
            guards.insert(name.clone(), Guard::constant(*value));
        }
        guards
    }
}

impl fmt::Display for GuardAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .values
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        f.write_str(&rendered.join(", "))
    }
}

/// Every assignment over all guards in `guards`.
///
/// Returns an empty list when there are no guards, meaning "use the
/// machine's own guard implementations unchanged".
pub fn combinations(guards: &Guards) -> PlanResult<Vec<GuardAssignment>> {
    let names: Vec<String> = guards.names().cloned().collect();
    combinations_of(&names)
}

/// Every assignment over `names`; bit `j` of the index fixes `names[j]`.
///
/// More than [`BITMASK_LIMIT`] names fail with
/// [`PlanError::GuardLimitExceeded`].
pub fn combinations_of(names: &[String]) -> PlanResult<Vec<GuardAssignment>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }
    if names.len() > BITMASK_LIMIT {
        return Err(PlanError::GuardLimitExceeded {
            count: names.len(),
            limit: BITMASK_LIMIT,
        });
    }
    Ok((0..1usize << names.len())
        .map(|index| GuardAssignment {
            index,
            values: names
                .iter()
                .enumerate()
                .map(|(bit, name)| (name.clone(), index & (1 << bit) != 0))
                .collect(),
        })
        .collect())
}

/// Names of the guards to vary, checked against the enumeration limit.
///
/// With `vary` unset every supplied guard is varied; otherwise only the
/// listed names are, and the rest keep their implementations.
pub fn varied_guards(
    guards: &Guards,
    vary: Option<&BTreeSet<String>>,
    max_guards: usize,
) -> PlanResult<Vec<String>> {
    let names: Vec<String> = match vary {
        Some(selected) => selected.iter().cloned().collect(),
        None => guards.names().cloned().collect(),
    };
    let limit = max_guards.min(BITMASK_LIMIT);
    if names.len() > limit {
        return Err(PlanError::GuardLimitExceeded {
            count: names.len(),
            limit,
        });
    }
    Ok(names)
}
