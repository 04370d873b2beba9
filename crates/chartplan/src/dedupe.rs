//! Plan deduplicator: merges plans by description and paths by signature.

use crate::plan::TestPlan;
use std::collections::{HashMap, HashSet};

/// Merge `plans` sharing a description into the first one seen.
///
/// Paths are kept only if their signature is new for that plan, and every
/// kept path gets its signature as description. Plans keep first-seen order;
/// paths keep arrival order.
#[must_use]
pub fn dedupe<C>(plans: Vec<TestPlan<C>>) -> Vec<TestPlan<C>> {
    let mut unique: Vec<TestPlan<C>> = Vec::new();
    let mut seen: Vec<HashSet<String>> = Vec::new();
    let mut by_description: HashMap<String, usize> = HashMap::new();

    for plan in plans {
        let TestPlan {
            description,
            state,
            paths,
        } = plan;
        let index = *by_description.entry(description.clone()).or_insert_with(|| {
            unique.push(TestPlan {
                description,
                state,
                paths: Vec::new(),
            });
            seen.push(HashSet::new());
            unique.len() - 1
        });

        for mut path in paths {
            let signature = path.signature();
            if seen[index].insert(signature) {
                path.derive_description();
                unique[index].paths.push(path);
            }
        }
    }

    unique
}
