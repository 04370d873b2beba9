//! Statechart augmenter: attaches a logging test hook to every leaf state.

use crate::chart::StateNode;
use crate::hooks::{StateTest, StateTests, TestFunction};
use crate::logger::Logger;
use std::collections::BTreeMap;

/// Copy of `chart` where every leaf state carries a test hook.
///
/// The hook logs the leaf's key at `Debug`, then runs the matching
/// [`TestFunction::Leaf`] from `tests` if there is one. Compound children
/// recurse with their [`TestFunction::Nested`] map, or with an empty map when
/// the slot holds a leaf test. Metadata is kept as is; neither input is
/// modified.
#[must_use]
pub fn augment<C: 'static>(chart: &StateNode<C>, tests: &StateTests<C>, logger: &Logger) -> StateNode<C> {
    let mut augmented = chart.clone();
    augmented.states = chart.states.as_ref().map(|states| {
        states
            .iter()
            .map(|(key, child)| (key.clone(), augment_child(key, child, tests, logger)))
            .collect::<BTreeMap<_, _>>()
    });
    augmented
}

fn augment_child<C: 'static>(
    key: &str,
    child: &StateNode<C>,
    tests: &StateTests<C>,
    logger: &Logger,
) -> StateNode<C> {
    if child.is_compound() {
        let empty = StateTests::new();
        let nested = match tests.get(key) {
            Some(TestFunction::Nested(nested)) => nested,
            _ => &empty,
        };
        return augment(child, nested, logger);
    }

    let test = match tests.get(key) {
        Some(TestFunction::Leaf(test)) => Some(test.clone()),
        _ => None,
    };
    child.clone().with_test(leaf_hook(key, test, logger.clone()))
}

fn leaf_hook<C: 'static>(key: &str, test: Option<StateTest<C>>, logger: Logger) -> StateTest<C> {
    let message = format!("    {key}");
    StateTest::new(move |ctx, state| {
        logger.debug(&message);
        match &test {
            Some(test) => test.call(ctx, state),
            None => Box::pin(futures::future::ready(Ok(()))),
        }
    })
}
