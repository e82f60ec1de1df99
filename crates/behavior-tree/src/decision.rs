//! Output of a labeled selection.

/// The output produced by a [`crate::Selector`] together with the label of
/// the branch that produced it.
///
/// Labels are static strings chosen when the tree is built. Callers use them
/// for introspection (e.g. "why did the agent do this?") without the nodes
/// having to know about reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decision<O> {
    /// Label of the branch that produced the output.
    pub label: &'static str,

    /// The produced output.
    pub output: O,
}

impl<O> Decision<O> {
    /// Creates a decision for the given branch label.
    #[inline]
    pub fn new(label: &'static str, output: O) -> Self {
        Self { label, output }
    }

    /// Discards the label and returns the output.
    #[inline]
    pub fn into_output(self) -> O {
        self.output
    }
}
