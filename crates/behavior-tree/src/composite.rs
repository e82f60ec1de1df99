//! Composite behavior nodes.
//!
//! Composite nodes control the evaluation order of multiple child behaviors.
//! [`Selector`] is the building block of a priority rule list.

use crate::{Behavior, Decision};

type LabeledChild<I, S, O> = (&'static str, Box<dyn Behavior<I, S, O>>);

/// Evaluates child behaviors in priority order until one produces an output.
///
/// # Semantics
///
/// A `Selector` node evaluates its children from first to last:
/// - If a child returns `Some`, the selector **stops immediately** and returns it
/// - If a child returns `None`, the selector **continues** to the next child
/// - If every child declines, the selector returns `None`
///
/// There is no backtracking: children after the winner are never evaluated
/// within that tick.
pub struct Selector<I: ?Sized, S, O> {
    children: Vec<LabeledChild<I, S, O>>,
}

impl<I: ?Sized, S, O> Selector<I, S, O> {
    /// Creates a new selector with the given labeled children.
    ///
    /// # Panics
    ///
    /// Panics if `children` is empty. A selector with no children is
    /// meaningless and likely indicates a programming error.
    pub fn new(children: Vec<LabeledChild<I, S, O>>) -> Self {
        assert!(
            !children.is_empty(),
            "Selector must have at least one child"
        );
        Self { children }
    }

    /// Evaluates the children and returns the winning output with its label.
    pub fn select(&self, input: &I, state: &mut S) -> Option<Decision<O>> {
        for (label, child) in &self.children {
            if let Some(output) = child.tick(input, state) {
                return Some(Decision::new(*label, output)); // Short-circuit
            }
        }
        None
    }

    /// Labels of the children in evaluation order.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.children.iter().map(|(label, _)| *label)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<I: ?Sized, S, O> Behavior<I, S, O> for Selector<I, S, O> {
    fn tick(&self, input: &I, state: &mut S) -> Option<O> {
        self.select(input, state).map(Decision::into_output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rule;

    struct Counter {
        evaluated: Vec<&'static str>,
    }

    fn declines(_: &i32, ctx: &mut Counter) -> Option<&'static str> {
        ctx.evaluated.push("declines");
        None
    }

    fn answers(_: &i32, ctx: &mut Counter) -> Option<&'static str> {
        ctx.evaluated.push("answers");
        Some("first")
    }

    fn also_answers(_: &i32, ctx: &mut Counter) -> Option<&'static str> {
        ctx.evaluated.push("also_answers");
        Some("second")
    }

    fn boxed(
        f: fn(&i32, &mut Counter) -> Option<&'static str>,
    ) -> Box<dyn Behavior<i32, Counter, &'static str>> {
        Box::new(Rule::new(f))
    }

    #[test]
    fn selector_returns_first_answer() {
        let sel = Selector::new(vec![
            ("a", boxed(declines)),
            ("b", boxed(answers)),
            ("c", boxed(also_answers)), // Should not execute
        ]);

        let mut ctx = Counter { evaluated: vec![] };
        let decision = sel.select(&0, &mut ctx).unwrap();
        assert_eq!(decision.label, "b");
        assert_eq!(decision.output, "first");
        assert_eq!(ctx.evaluated, vec!["declines", "answers"]);
    }

    #[test]
    fn selector_declines_when_all_decline() {
        let sel = Selector::new(vec![("a", boxed(declines)), ("b", boxed(declines))]);

        let mut ctx = Counter { evaluated: vec![] };
        assert_eq!(sel.tick(&0, &mut ctx), None);
        assert_eq!(ctx.evaluated.len(), 2);
    }

    #[test]
    fn labels_follow_priority_order() {
        let sel = Selector::new(vec![("high", boxed(declines)), ("low", boxed(answers))]);
        assert_eq!(sel.labels().collect::<Vec<_>>(), vec!["high", "low"]);
        assert_eq!(sel.len(), 2);
    }
}
