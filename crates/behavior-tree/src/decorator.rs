//! Decorator behavior nodes.
//!
//! Decorators wrap a single child behavior and gate its result.
//! This module provides [`Guard`] (precondition).

use crate::Behavior;

type Predicate<I, S> = Box<dyn Fn(&I, &S) -> bool + Send + Sync>;

/// Evaluates its child only when a predicate holds.
///
/// # Semantics
///
/// - If the predicate returns `false`, the guard declines without touching
///   the child (no side effects on the state)
/// - Otherwise the child's result is returned unchanged
pub struct Guard<I: ?Sized, S, O> {
    predicate: Predicate<I, S>,
    child: Box<dyn Behavior<I, S, O>>,
}

impl<I: ?Sized, S, O> Guard<I, S, O> {
    /// Creates a guard that evaluates `child` only when `predicate` holds.
    pub fn new(
        predicate: impl Fn(&I, &S) -> bool + Send + Sync + 'static,
        child: Box<dyn Behavior<I, S, O>>,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            child,
        }
    }
}

impl<I: ?Sized, S, O> Behavior<I, S, O> for Guard<I, S, O> {
    fn tick(&self, input: &I, state: &mut S) -> Option<O> {
        if (self.predicate)(input, &*state) {
            self.child.tick(input, state)
        } else {
            None
        }
    }
}
