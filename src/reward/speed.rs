use super::{exp_falloff, Reward};
use crate::util::Interval;

/// The speed the vehicle should be travelling at.
///
/// A curvature multiplier of 1 gives the maximum speed; the target is clamped
/// to the speed bounds for any multiplier.
pub fn target_speed(bounds: Interval<f64>, curvature_multiplier: f64) -> f64 {
    bounds.clamp(bounds.lerp(curvature_multiplier))
}

/// Rewards travelling at the target speed.
///
/// Matching the target earns exactly 1, as does exceeding a target at the
/// maximum speed or falling short of a target at the minimum speed.
pub fn speed_reward(speed: f64, target: f64, bounds: Interval<f64>, floor: f64) -> Reward {
    let saturated = (target == bounds.max && speed > bounds.max)
        || (target == bounds.min && speed < bounds.min);
    if speed == target || saturated {
        return Reward::MAX;
    }
    let x = (speed - target).abs() / bounds.max;
    Reward::new(exp_falloff(x), floor)
}
