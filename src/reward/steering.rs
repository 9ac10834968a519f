use super::{cos_falloff, Reward};

/// Rewards gentle steering, scaled by the curvature multiplier.
///
/// A multiplier below 1 tolerates more steering, as when entering a curve;
/// a multiplier above 1 tolerates less.
pub fn steering_reward(
    steering_angle: f64,
    curvature_multiplier: f64,
    max_steering: f64,
    floor: f64,
) -> Reward {
    let error = (steering_angle * curvature_multiplier).abs().min(max_steering);
    Reward::new(cos_falloff(error, max_steering), floor)
}
