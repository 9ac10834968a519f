use std::f64::consts::PI;

use rand::prelude::*;
use rand_distr::Normal;
use track_reward::{
    math::{angle_delta, bearing, Point2d},
    EngineError, JsonLinesSink, Params, RewardConfig, RewardEngine,
};

/// The number of laps to drive.
const LAPS: usize = 3;

/// Sub-steps between consecutive waypoints.
const STEPS_PER_WAYPOINT: usize = 4;

/// A stadium shaped track: two straights joined by semicircles.
fn oval(straight: f64, radius: f64, spacing: f64) -> Vec<[f64; 2]> {
    let mut points = vec![];
    let straight_count = (straight / spacing).round() as usize;
    let arc_count = (PI * radius / spacing).round() as usize;
    for (offset, sign) in [(0.0, 1.0), (straight, -1.0)] {
        for i in 0..straight_count {
            let x = offset + sign * i as f64 * straight / straight_count as f64;
            let y = if sign > 0.0 { -radius } else { radius };
            points.push([x, y]);
        }
        let centre_x = if sign > 0.0 { straight } else { 0.0 };
        let start = if sign > 0.0 { -PI / 2.0 } else { PI / 2.0 };
        for i in 0..arc_count {
            let theta = start + PI * i as f64 / arc_count as f64;
            points.push([centre_x + radius * theta.cos(), radius * theta.sin()]);
        }
    }
    points
}

/// Drives a noisy vehicle around the waypoints for `laps` laps, returning the reward of every step.
fn drive(
    config: RewardConfig,
    waypoints: &[[f64; 2]],
    laps: usize,
    seed: u64,
) -> Result<Vec<f64>, EngineError> {
    let count = waypoints.len();
    let mut engine = RewardEngine::with_sink(config, JsonLinesSink::new(std::io::sink()))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let lateral = Normal::new(0.0_f64, 0.15).unwrap();
    let heading_noise = Normal::new(0.0_f64, 8.0).unwrap();
    let speed_noise = Normal::new(0.0_f64, 0.4).unwrap();
    let steering_noise = Normal::new(0.0_f64, 6.0).unwrap();

    let mut rewards = vec![];
    let total_steps = laps * count * STEPS_PER_WAYPOINT;
    for step in 0..total_steps {
        let prev = (step / STEPS_PER_WAYPOINT) % count;
        let next = (prev + 1) % count;
        let frac = (step % STEPS_PER_WAYPOINT) as f64 / STEPS_PER_WAYPOINT as f64;
        let a = Point2d::new(waypoints[prev][0], waypoints[prev][1]);
        let b = Point2d::new(waypoints[next][0], waypoints[next][1]);
        let along = bearing(a, b);
        let normal = (along + 90.0).to_radians();
        let offset = lateral.sample(&mut rng);
        let pos = a + (b - a) * frac;

        let params = Params {
            x: pos.x + offset * normal.cos(),
            y: pos.y + offset * normal.sin(),
            heading: angle_delta(0.0, along + heading_noise.sample(&mut rng)),
            speed: (2.5 + speed_noise.sample(&mut rng)).clamp(0.5, 4.0),
            steering_angle: steering_noise.sample(&mut rng).clamp(-30.0, 30.0),
            distance_from_center: offset.abs(),
            is_left_of_center: offset > 0.0,
            progress: 100.0 * (step % (count * STEPS_PER_WAYPOINT)) as f64
                / (count * STEPS_PER_WAYPOINT) as f64,
            steps: step as u64 + 1,
            closest_waypoints: [prev as u32, next as u32],
            all_wheels_on_track: offset.abs() < 0.35,
            track_width: 0.76,
            waypoints: if step == 0 { waypoints.to_vec() } else { vec![] },
            ..Default::default()
        };
        rewards.push(engine.step(&params)?);
    }
    Ok(rewards)
}

fn main() {
    env_logger::init();

    let config = RewardConfig::default();
    let floor = config.min_reward;
    let waypoints = oval(20.0, 5.0, 0.5);
    let rewards = drive(config, &waypoints, LAPS, 42).unwrap();

    let mean = rewards.iter().sum::<f64>() / rewards.len() as f64;
    let min = rewards.iter().copied().fold(f64::INFINITY, f64::min);
    let max = rewards.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let floored = rewards.iter().filter(|r| **r == floor).count();
    println!(
        "{} steps over {} waypoints: mean reward {:.4} (min {:.5}, max {:.4}), {} at the floor",
        rewards.len(),
        waypoints.len(),
        mean,
        min,
        max,
        floored
    );
}

#[cfg(test)]
mod test {
    use super::*;
    use track_reward::MIN_REWARD;

    #[test]
    fn oval_closes_up() {
        let waypoints = oval(20.0, 5.0, 0.5);
        assert_eq!(waypoints.len(), 2 * (40 + 31));
        let first = waypoints[0];
        let last = waypoints[waypoints.len() - 1];
        let gap = ((first[0] - last[0]).powi(2) + (first[1] - last[1]).powi(2)).sqrt();
        assert!(gap < 1.0, "{}", gap);
    }

    #[test]
    fn noisy_laps_stay_in_bounds() {
        let waypoints = oval(20.0, 5.0, 0.5);
        let rewards = drive(RewardConfig::default(), &waypoints, 2, 7).unwrap();
        assert_eq!(rewards.len(), 2 * waypoints.len() * STEPS_PER_WAYPOINT);
        assert!(
            rewards.iter().all(|r| (MIN_REWARD..=1.0).contains(r)),
            "{:?}",
            rewards
        );
        assert!(rewards.iter().any(|r| *r > MIN_REWARD));
    }
}
