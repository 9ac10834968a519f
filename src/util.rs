//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;
use serde::{Deserialize, Serialize};

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    /// Returns true if `min` does not exceed `max`.
    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

impl<T: Float> Interval<T> {
    /// Restricts a value to lie within the interval.
    pub fn clamp(&self, value: T) -> T {
        value.max(self.min).min(self.max)
    }

    /// Linearly interpolates between `min` (at `t = 0`) and `max` (at `t = 1`).
    pub fn lerp(&self, t: T) -> T {
        self.min + t * (self.max - self.min)
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

/// Iterates over `0..count` starting from `start` and wrapping around,
/// visiting every index exactly once.
pub fn rotated_range(count: usize, start: usize) -> impl ExactSizeIterator<Item = usize> + Clone {
    (0..count)
        .map(move |i| i + start)
        .map(move |i| if i >= count { i - count } else { i })
}

/// Iterates over `0..count` backwards starting from `start` and wrapping around,
/// visiting every index exactly once.
pub fn rotated_range_rev(
    count: usize,
    start: usize,
) -> impl ExactSizeIterator<Item = usize> + Clone {
    (0..count).map(move |i| if i <= start { start - i } else { start + count - i })
}
