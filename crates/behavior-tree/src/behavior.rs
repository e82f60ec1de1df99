//! Core behavior trait.
//!
//! This module defines the [`Behavior`] trait, the fundamental abstraction
//! for all rule tree nodes. The trait is generic over the read-only input
//! `I`, the mutable state `S`, and the output `O` a node may produce.

use std::marker::PhantomData;

/// A rule tree node that can be evaluated against an input and a state.
pub trait Behavior<I: ?Sized, S, O>: Send + Sync {
    /// Evaluate this node.
    ///
    /// # Arguments
    ///
    /// * `input` - Read-only observation for the current tick.
    /// * `state` - Mutable agent memory. Nodes may update counters or caches
    ///   even when they decline.
    ///
    /// # Returns
    ///
    /// - `Some(output)` if the node produced an output
    /// - `None` if the node declined
    fn tick(&self, input: &I, state: &mut S) -> Option<O>;
}

/// Blanket implementation for boxed behaviors.
///
/// This allows `Box<dyn Behavior<I, S, O>>` to also implement `Behavior`,
/// enabling dynamic dispatch and heterogeneous collections of nodes.
impl<I: ?Sized, S, O> Behavior<I, S, O> for Box<dyn Behavior<I, S, O>> {
    #[inline]
    fn tick(&self, input: &I, state: &mut S) -> Option<O> {
        (**self).tick(input, state)
    }
}

/// Leaf node backed by a plain function or closure.
///
/// Most rules in a tree are free functions of the shape
/// `fn(&I, &mut S) -> Option<O>`; wrapping them in `Rule` lets them sit in a
/// composite next to hand-written nodes.
pub struct Rule<F, I: ?Sized, S, O> {
    func: F,
    _marker: PhantomData<fn(&I, &mut S) -> Option<O>>,
}

impl<F, I: ?Sized, S, O> Rule<F, I, S, O>
where
    F: Fn(&I, &mut S) -> Option<O>,
{
    /// Wraps `func` as a leaf node.
    pub fn new(func: F) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

impl<F, I: ?Sized, S, O> Behavior<I, S, O> for Rule<F, I, S, O>
where
    F: Fn(&I, &mut S) -> Option<O> + Send + Sync,
{
    #[inline]
    fn tick(&self, input: &I, state: &mut S) -> Option<O> {
        (self.func)(input, state)
    }
}
