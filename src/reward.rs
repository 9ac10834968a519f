//! Bounded rewards and the sub-reward processors.

pub use centerline::centerline_reward;
pub use heading::{heading_error, heading_reward};
pub use speed::{speed_reward, target_speed};
pub use steering::steering_reward;

use serde::Serialize;
use std::f64::consts::E;

mod centerline;
mod heading;
mod speed;
mod steering;

/// The default floor reward.
pub const MIN_REWARD: f64 = 1e-5;

/// A reward in the range `[floor, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Reward(f64);

impl Reward {
    /// The maximum reward.
    pub const MAX: Reward = Reward(1.0);

    /// Creates a reward, clamping `value` into `[floor, 1]`. NaN becomes the floor.
    pub fn new(value: f64, floor: f64) -> Self {
        if value.is_nan() {
            Self(floor)
        } else {
            Self(value.max(floor).min(1.0))
        }
    }

    /// The floor reward.
    pub fn floor(floor: f64) -> Self {
        Self(floor)
    }

    /// The value of the reward.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<Reward> for f64 {
    fn from(reward: Reward) -> Self {
        reward.0
    }
}

/// The four sub-rewards of a step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SubRewards {
    pub centerline: Reward,
    pub heading: Reward,
    pub steering: Reward,
    pub speed: Reward,
}

impl SubRewards {
    /// The sub-reward values, in the order centerline, heading, steering, speed.
    pub fn values(&self) -> [f64; 4] {
        [
            self.centerline.value(),
            self.heading.value(),
            self.steering.value(),
            self.speed.value(),
        ]
    }
}

/// Normalised exponential decay: 1 at `x = 0`, 0 at `x = 1`, negative beyond.
pub(crate) fn exp_falloff(x: f64) -> f64 {
    let tail = 1.0 / E;
    ((-x).exp() - tail) / (1.0 - tail)
}

/// Normalised cosine falloff: 1 for no error, 0 for an error of `max` degrees.
pub(crate) fn cos_falloff(error: f64, max: f64) -> f64 {
    if max <= 0.0 {
        return if error <= 0.0 { 1.0 } else { 0.0 };
    }
    let floor = max.to_radians().cos();
    (error.to_radians().cos() - floor) / (1.0 - floor)
}
