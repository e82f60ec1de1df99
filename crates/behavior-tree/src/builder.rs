//! Builder utilities for ergonomic rule tree construction.
//!
//! This module provides helper functions to reduce boilerplate when building
//! rule trees. Instead of writing verbose `Box::new(Rule::new(f))`, you can
//! use shorter functions like `rule(f)`.

use crate::{Behavior, Guard, Rule};

/// Creates a leaf node from a function.
///
/// Shorthand for `Box::new(Rule::new(func))`.
#[inline]
pub fn rule<F, I, S, O>(func: F) -> Box<dyn Behavior<I, S, O>>
where
    F: Fn(&I, &mut S) -> Option<O> + Send + Sync + 'static,
    I: ?Sized + 'static,
    S: 'static,
    O: 'static,
{
    Box::new(Rule::new(func))
}

/// Creates a guard node.
///
/// Shorthand for `Box::new(Guard::new(predicate, child))`.
#[inline]
pub fn guard<I: ?Sized + 'static, S: 'static, O: 'static>(
    predicate: impl Fn(&I, &S) -> bool + Send + Sync + 'static,
    child: Box<dyn Behavior<I, S, O>>,
) -> Box<dyn Behavior<I, S, O>> {
    Box::new(Guard::new(predicate, child))
}

