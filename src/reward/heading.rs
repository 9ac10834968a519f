use super::{cos_falloff, Reward};
use crate::math::angle_between;
use crate::target::TargetData;

/// The angle between the vehicle's heading and the bearing to the target point,
/// in the range `[0, 180]`.
pub fn heading_error(target: &TargetData, heading360: f64) -> f64 {
    angle_between(target.bearing(), heading360)
}

/// Rewards heading towards the target point.
///
/// # Parameters
/// * `target` - The target point
/// * `heading360` - The vehicle's heading in `[0, 360)`
/// * `max_error` - Errors of this many degrees or more earn the floor reward
/// * `tolerance` - Errors up to this many degrees earn the full reward
/// * `floor` - The floor reward
pub fn heading_reward(
    target: &TargetData,
    heading360: f64,
    max_error: f64,
    tolerance: f64,
    floor: f64,
) -> Reward {
    let range = (max_error - tolerance).max(0.0);
    let error = (heading_error(target, heading360).min(max_error) - tolerance).max(0.0);
    Reward::new(cos_falloff(error, range), floor)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::{LineSegment2d, Point2d};
    use crate::reward::MIN_REWARD;
    use assert_approx_eq::assert_approx_eq;

    fn target_east() -> TargetData {
        let position = Point2d::new(0.0, 0.0);
        let target_point = Point2d::new(5.0, 0.0);
        TargetData {
            target_point,
            target_line: LineSegment2d::from_ends(position, target_point),
            direction: LineSegment2d::from_ends(Point2d::new(0.0, 0.0), target_point),
        }
    }

    #[test]
    fn aligned_heading_earns_full_reward() {
        assert_eq!(heading_reward(&target_east(), 0.0, 30.0, 0.0, MIN_REWARD), Reward::MAX);
    }

    #[test]
    fn error_wraps_around_north() {
        let target = target_east();
        assert_approx_eq!(heading_error(&target, 350.0), 10.0);
        assert_eq!(
            heading_reward(&target, 350.0, 30.0, 0.0, MIN_REWARD),
            heading_reward(&target, 10.0, 30.0, 0.0, MIN_REWARD)
        );
    }

    #[test]
    fn large_errors_earn_the_floor() {
        let target = target_east();
        assert_eq!(heading_reward(&target, 30.0, 30.0, 0.0, MIN_REWARD).value(), MIN_REWARD);
        assert_eq!(heading_reward(&target, 180.0, 30.0, 0.0, MIN_REWARD).value(), MIN_REWARD);
    }

    #[test]
    fn tolerance_widens_the_full_reward() {
        let target = target_east();
        assert_eq!(heading_reward(&target, 5.0, 30.0, 5.0, MIN_REWARD), Reward::MAX);
        let tolerant = heading_reward(&target, 15.0, 30.0, 5.0, MIN_REWARD);
        let strict = heading_reward(&target, 15.0, 30.0, 0.0, MIN_REWARD);
        assert!(tolerant < Reward::MAX);
        assert!(tolerant > strict);
    }
}
