//! Tests that drive a reward engine around simple synthetic tracks.

use assert_approx_eq::assert_approx_eq;
use rand::prelude::*;
use track_reward::{
    reward::{centerline_reward, speed_reward, target_speed},
    EngineError, Interval, MemorySink, Params, RewardConfig, RewardEngine, TrackError,
    MIN_REWARD,
};

fn square() -> Vec<[f64; 2]> {
    vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]
}

/// A vehicle in the middle of the first edge, driving straight along it at minimum speed.
fn on_first_edge() -> Params {
    Params {
        x: 5.0,
        y: 0.0,
        heading: 0.0,
        speed: 1.5,
        steering_angle: 0.0,
        distance_from_center: 0.0,
        progress: 12.5,
        steps: 1,
        closest_waypoints: [0, 1],
        all_wheels_on_track: true,
        track_width: 1.0,
        track_length: 40.0,
        waypoints: square(),
        ..Default::default()
    }
}

/// Test the closed form reward of a vehicle on a square track.
#[test]
fn square_track_closed_form() {
    let mut engine = RewardEngine::new(RewardConfig::default()).unwrap();
    let outcome = engine.evaluate(&on_first_edge()).unwrap();

    let sub_rewards = outcome.sub_rewards.unwrap();
    assert_eq!(sub_rewards.centerline.value(), 1.0);
    assert_eq!(sub_rewards.heading.value(), 1.0);
    assert_eq!(sub_rewards.steering.value(), 1.0);

    // Target speed is the maximum on a straight, so the speed error is 2.5 / 4
    let e = std::f64::consts::E;
    let speed = ((-0.625f64).exp() - 1.0 / e) / (1.0 - 1.0 / e);
    assert_approx_eq!(sub_rewards.speed.value(), speed);
    assert_approx_eq!(outcome.reward.value(), (3.0 + speed) / 4.0);
    assert!(outcome.reward.value() > MIN_REWARD);
    assert!(outcome.reward.value() < 1.0);

    let geometry = outcome.geometry.unwrap();
    assert!(geometry.curve.straight.is_some());
    assert_eq!(geometry.target_speed, 4.0);
    assert_approx_eq!(geometry.target.target_point.x, 10.0);
}

/// Test that every failure flag earns exactly the floor reward.
#[test]
fn failure_flags_earn_the_floor() {
    let failures = [
        Params {
            is_crashed: true,
            ..on_first_edge()
        },
        Params {
            is_offtrack: true,
            ..on_first_edge()
        },
        Params {
            is_reversed: true,
            ..on_first_edge()
        },
        Params {
            all_wheels_on_track: false,
            ..on_first_edge()
        },
    ];
    for params in failures {
        let mut engine = RewardEngine::new(RewardConfig::default()).unwrap();
        assert_eq!(engine.step(&params).unwrap(), MIN_REWARD);
    }
}

/// Test that failure flags leave the geometry unmeasured.
#[test]
fn failure_flags_skip_the_geometry() {
    let config = RewardConfig {
        min_reward: 0.01,
        ..Default::default()
    };
    let mut engine = RewardEngine::new(config).unwrap();
    let params = Params {
        is_offtrack: true,
        x: 500.0,
        y: -500.0,
        ..on_first_edge()
    };
    let outcome = engine.evaluate(&params).unwrap();
    assert_eq!(outcome.reward.value(), 0.01);
    assert!(outcome.geometry.is_none());
}

/// Test that rewards stay within bounds for random on-track samples.
#[test]
fn rewards_are_bounded() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut engine = RewardEngine::new(RewardConfig::default()).unwrap();
    let waypoints = (0..40)
        .map(|i| {
            let theta = i as f64 / 40.0 * std::f64::consts::TAU;
            [8.0 * theta.cos(), 5.0 * theta.sin()]
        })
        .collect::<Vec<_>>();
    for step in 0..500u64 {
        let prev = rng.gen_range(0..40u32);
        let next = (prev + 1) % 40;
        let params = Params {
            x: rng.gen_range(-9.0..9.0),
            y: rng.gen_range(-6.0..6.0),
            heading: rng.gen_range(-180.0..180.0),
            speed: rng.gen_range(0.0..6.0),
            steering_angle: rng.gen_range(-30.0..30.0),
            distance_from_center: rng.gen_range(0.0..0.6),
            steps: step + 1,
            closest_waypoints: [prev, next],
            all_wheels_on_track: true,
            track_width: 1.0,
            waypoints: waypoints.clone(),
            ..Default::default()
        };
        let reward = engine.step(&params).unwrap();
        assert!((MIN_REWARD..=1.0).contains(&reward), "{}", reward);
    }
}

/// Test that the centerline reward never increases as the vehicle leaves the centre.
#[test]
fn centerline_reward_is_monotonic() {
    for width in [0.5, 0.76, 1.0, 3.0] {
        let rewards = (0..=200)
            .map(|i| centerline_reward(i as f64 / 200.0 * width / 2.0, width, MIN_REWARD))
            .collect::<Vec<_>>();
        assert!(rewards.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(rewards[0].value(), 1.0);
        assert_eq!(rewards[200].value(), MIN_REWARD);
    }
}

/// Test that driving at the target speed earns exactly one.
#[test]
fn speed_at_target_is_exactly_one() {
    let bounds = Interval::new(1.5, 4.0);
    let target = target_speed(bounds, 1.0);
    assert_eq!(target, 4.0);
    assert_eq!(speed_reward(4.0, target, bounds, MIN_REWARD).value(), 1.0);
}

/// Test that the engine tracks motion between steps.
#[test]
fn history_follows_the_vehicle() {
    let mut engine = RewardEngine::with_sink(RewardConfig::default(), MemorySink::new()).unwrap();
    let first = engine.evaluate(&on_first_edge()).unwrap();
    assert_eq!(first.history.velocity, 0.0);
    assert_eq!(first.history.distance, 0.0);

    let moved = Params {
        x: 6.0,
        steps: 16,
        waypoints: vec![],
        ..on_first_edge()
    };
    let second = engine.evaluate(&moved).unwrap();
    assert_approx_eq!(second.history.distance, 1.0);
    assert_approx_eq!(second.history.dt, 1.0);
    assert_approx_eq!(second.history.velocity, 1.0);

    let simultaneous = Params {
        x: 6.5,
        sim_time: Some(second.sample.sim_time),
        waypoints: vec![],
        ..on_first_edge()
    };
    let third = engine.evaluate(&simultaneous).unwrap();
    assert_eq!(third.history.velocity, f64::INFINITY);
    assert!(!third.history.velocity_determined());
    assert_eq!(engine.sink().records().len(), 3);
}

/// Test that a bend ahead lowers the target speed, more so as it gets closer.
#[test]
fn bend_ahead_lowers_target_speed() {
    let mut points = vec![];
    points.extend((0..10).map(|i| [i as f64, 0.0]));
    points.extend((0..10).map(|i| [10.0, i as f64]));
    points.extend((0..10).map(|i| [10.0 - i as f64, 10.0]));
    points.extend((0..10).map(|i| [0.0, 10.0 - i as f64]));
    let mut engine = RewardEngine::new(RewardConfig::default()).unwrap();
    let outcome = engine
        .evaluate(&Params {
            x: 8.6,
            y: 0.0,
            closest_waypoints: [8, 9],
            waypoints: points,
            ..on_first_edge()
        })
        .unwrap();
    let geometry = outcome.geometry.unwrap();
    assert!(geometry.curve.curve_enter.is_some());
    assert_approx_eq!(geometry.curve.next_segment_ratio, 1.4);
    // 0.5 for the curve, 0.5 for entering it, 0.4 along the approach ramp
    assert_approx_eq!(geometry.curvature_multiplier, 0.1);
    assert_approx_eq!(geometry.target_speed, 1.75);
}

/// Test that out of range waypoint indices are rejected without touching the session.
#[test]
fn bad_indices_are_rejected() {
    let mut engine = RewardEngine::new(RewardConfig::default()).unwrap();
    let params = Params {
        closest_waypoints: [3, 4],
        ..on_first_edge()
    };
    assert!(matches!(
        engine.step(&params),
        Err(EngineError::Telemetry(_))
    ));
    assert!(engine.topology().is_none());
    assert!(matches!(
        engine.step(&Params {
            waypoints: vec![[0.0, 0.0], [0.0, f64::INFINITY]],
            ..on_first_edge()
        }),
        Err(EngineError::Track(TrackError::NonFinitePoint { index: 1 }))
    ));
}
