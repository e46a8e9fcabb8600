#![allow(
    clippy::excessive_precision,
    clippy::unreadable_literal,
    reason = "we don't really want to read the mathematical constants in this file."
)]

use std::fmt;

mod units;
pub use units::*;

mod physics;
pub use physics::*;


/// Returned by the `assert_approx` family of functions when two values differ by more than the
/// tolerance.
#[derive(Debug, thiserror::Error)]
#[error("expected {expect:?} within {epsilon:?}, got {actual:?}")]
pub struct AssertApproxError<T: fmt::Debug, Eps: fmt::Debug> {
    pub actual:  T,
    pub expect:  T,
    pub epsilon: Eps,
}

/// Asserts that two raw scalars are within `epsilon` of each other.
///
/// # Errors
/// If the absolute difference between `actual` and `expect` is greater than `epsilon`.
pub fn assert_approx_f64(
    actual: f64,
    expect: f64,
    epsilon: f64,
) -> Result<(), AssertApproxError<f64, f64>> {
    if (actual - expect).abs() > epsilon || actual.is_nan() {
        Err(AssertApproxError { actual, expect, epsilon })
    } else {
        Ok(())
    }
}

pub trait Between<U>: PartialOrd<U> {
    fn between_inclusive(&self, min: &U, max: &U) -> bool { self >= min && self <= max }
}

impl<T: PartialOrd<U>, U> Between<U> for T {}

/// Inverse of linear interpolation: the fraction of `value` between `start` and `end`.
///
/// Returns 1 if `start` and `end` coincide.
#[must_use]
pub fn inverse_lerp(start: f64, end: f64, value: f64) -> f64 {
    let span = end - start;
    if span == 0. { 1. } else { (value - start) / span }
}
