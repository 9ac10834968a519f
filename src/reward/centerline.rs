use super::{exp_falloff, Reward};

/// Rewards staying near the centre line.
///
/// The reward is 1 anywhere within a quarter of the track width of the centre
/// line and decays to the floor at the edge of the track.
pub fn centerline_reward(distance_from_center: f64, track_width: f64, floor: f64) -> Reward {
    let factor = (2.0 * distance_from_center / track_width).clamp(0.5, 1.0);
    let x = (factor - 0.5) / 0.5;
    Reward::new(exp_falloff(x), floor)
}
