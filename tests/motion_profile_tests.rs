use lattice_planner::domains::path_planning::{
    apply_motion_profile, Path, PathMotionProfile, PathSegment, Point2D, SegmentKind,
    FINAL_PATH_SEGMENT_SPEED_MMPS, MIN_SPLIT_LENGTH_MM,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::{FRAC_PI_2, PI};

fn straight(lengths: &[f64]) -> Path {
    let mut path = Path::new();
    let mut x = 0.0;
    for len in lengths {
        path.append_line(Point2D::new(x, 0.0), Point2D::new(x + len, 0.0), 1.0, 0.0, 0.0);
        x += len;
    }
    path
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 0.01, "expected {:.3}, got {:.3}", expected, actual);
}

/// Every translating pair that flows into each other must be able to slow
/// from the first commanded speed to the second within the first segment.
fn assert_decel_feasible(out: &Path) {
    for pair in out.segments().windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.is_point_turn() || b.is_point_turn() || a.is_reverse() != b.is_reverse() {
            continue;
        }
        let decel = a.decel().min(b.decel());
        let lhs = a.target_speed().powi(2);
        let rhs = b.target_speed().powi(2) + 2.0 * decel * a.length();
        // Merging a sub-minimum piece may shift a speed change by up to one
        // minimum split length on either side.
        let tolerance = 2.0 * a.decel().max(b.decel()) * MIN_SPLIT_LENGTH_MM + 1e-6 * lhs.max(1.0);
        assert!(lhs <= rhs + tolerance, "cannot slow from {} to {} over {} mm", a, b, a.length());
    }
}

#[test]
fn test_three_segment_path_profile() {
    let profile = PathMotionProfile::custom(50.0, 10.0, 10.0);
    let out = apply_motion_profile(&straight(&[50.0, 50.0, 40.0]), &profile);

    let speeds: Vec<f64> = out.iter().map(PathSegment::target_speed).collect();
    assert_eq!(speeds.len(), 4);
    assert_close(speeds[0], 50.0);
    assert_close(speeds[1], 42.43);
    assert_close(speeds[2], 28.28);
    assert_close(speeds[3], FINAL_PATH_SEGMENT_SPEED_MMPS);
    assert_close(out.total_length(), 140.0);
    assert_decel_feasible(&out);
}

#[test]
fn test_single_short_segment_profile() {
    let profile = PathMotionProfile::custom(50.0, 10.0, 10.0);
    let out = apply_motion_profile(&straight(&[50.0]), &profile);
    assert_eq!(out.len(), 1);
    assert_close(out[0].target_speed(), 31.62);
}

#[test]
fn test_profiling_is_idempotent() {
    let profile = PathMotionProfile::custom(50.0, 10.0, 10.0);
    let once = apply_motion_profile(&straight(&[50.0, 50.0, 40.0]), &profile);
    let twice = apply_motion_profile(&once, &profile);

    assert_eq!(once.len(), twice.len());
    for (a, b) in once.iter().zip(twice.iter()) {
        assert_close(a.target_speed(), b.target_speed());
        assert_close(a.length(), b.length());
    }
}

#[test]
fn test_arc_split_preserves_sweep() {
    let profile = PathMotionProfile::custom(50.0, 10.0, 10.0);
    let mut path = straight(&[100.0]);
    path.append_arc(Point2D::new(100.0, 100.0), 100.0, -FRAC_PI_2, FRAC_PI_2, 1.0, 0.0, 0.0);

    let out = apply_motion_profile(&path, &profile);
    assert_eq!(out.len(), 3);
    let sweep: f64 = out
        .iter()
        .filter_map(|seg| match seg.kind() {
            SegmentKind::Arc { sweep, .. } => Some(*sweep),
            _ => None,
        })
        .sum();
    assert!((sweep - FRAC_PI_2).abs() < 1e-9);
    assert_close(out.total_length(), 100.0 + 50.0 * PI);
    assert_close(out.last().unwrap().target_speed(), FINAL_PATH_SEGMENT_SPEED_MMPS);
    assert_decel_feasible(&out);
}

#[test]
fn test_direction_reversal_stops_in_between() {
    let profile = PathMotionProfile::default();
    let mut path = Path::new();
    path.append_line(Point2D::new(0.0, 0.0), Point2D::new(400.0, 0.0), 1.0, 0.0, 0.0);
    path.append_line(Point2D::new(400.0, 0.0), Point2D::new(600.0, 0.0), 1.0, 0.0, 0.0);
    path.append_line(Point2D::new(600.0, 0.0), Point2D::new(300.0, 0.0), -1.0, 0.0, 0.0);

    let out = apply_motion_profile(&path, &profile);
    // The forward leg ends with a creep tail before backing up.
    let last_forward = out.iter().take_while(|s| !s.is_reverse()).last().unwrap();
    assert_close(last_forward.target_speed(), FINAL_PATH_SEGMENT_SPEED_MMPS);

    let reverse: Vec<&PathSegment> = out.iter().filter(|s| s.is_reverse()).collect();
    assert!(!reverse.is_empty());
    assert!(reverse.iter().all(|s| s.target_speed() < 0.0));
    assert!(reverse.iter().all(|s| s.target_speed().abs() <= profile.reverse_speed_mmps + 1e-9));
}

fn random_profile(rng: &mut StdRng) -> PathMotionProfile {
    let mut profile = PathMotionProfile::custom(
        rng.gen_range(20.0..300.0),
        rng.gen_range(5.0..800.0),
        rng.gen_range(5.0..800.0),
    );
    profile.reverse_speed_mmps = rng.gen_range(20.0..200.0);
    profile.dock_speed_mmps = rng.gen_range(20.0..120.0);
    profile.dock_accel_mmps2 = rng.gen_range(5.0..800.0);
    profile.dock_decel_mmps2 = rng.gen_range(5.0..800.0);
    profile.point_turn_speed_rad_per_sec = rng.gen_range(0.5..4.0);
    profile
}

/// Builds a connected path of random lines, arcs and point turns, some of
/// them reversing or docking.
fn random_path(rng: &mut StdRng) -> Path {
    let mut path = Path::new();
    let (mut x, mut y, mut heading) = (0.0_f64, 0.0_f64, 0.0_f64);
    for _ in 0..rng.gen_range(1..10) {
        let direction = if rng.gen_bool(0.25) { -1.0 } else { 1.0 };
        let docking = rng.gen_bool(0.15);
        let segment = match rng.gen_range(0..3) {
            0 => {
                let len = rng.gen_range(0.0..400.0);
                let (ex, ey) = (x + direction * len * heading.cos(), y + direction * len * heading.sin());
                let seg = PathSegment::line(Point2D::new(x, y), Point2D::new(ex, ey), direction, 0.0, 0.0);
                (x, y) = (ex, ey);
                seg.docking(docking)
            }
            1 => {
                let radius = rng.gen_range(20.0..300.0);
                let sweep = rng.gen_range(0.1..PI);
                let center = Point2D::new(x - radius * heading.sin(), y + radius * heading.cos());
                let start_angle = heading - FRAC_PI_2;
                let seg = PathSegment::arc(center, radius, start_angle, sweep, direction, 0.0, 0.0);
                x = center.x + radius * (start_angle + sweep).cos();
                y = center.y + radius * (start_angle + sweep).sin();
                heading += sweep;
                seg.docking(docking)
            }
            _ => {
                let target = heading + rng.gen_range(-PI..PI);
                let seg = PathSegment::point_turn(Point2D::new(x, y), heading, target, 0.0, 0.0, 0.0, 0.05);
                heading = target;
                seg
            }
        };
        path.push(segment);
    }
    path
}

#[test]
fn test_random_mixed_paths_are_feasible() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let profile = random_profile(&mut rng);
        let input = random_path(&mut rng);
        let out = apply_motion_profile(&input, &profile);

        assert!(out.len() >= input.len());
        assert!((out.total_length() - input.total_length()).abs() < 1e-6);
        assert_decel_feasible(&out);

        for seg in out.iter() {
            if seg.is_point_turn() {
                assert_eq!(seg.target_speed().abs(), profile.point_turn_speed_rad_per_sec);
                continue;
            }
            let cap = if seg.is_docking() { profile.dock_speed_mmps } else { profile.speed_mmps };
            let cap = if seg.is_reverse() { cap.min(profile.reverse_speed_mmps) } else { cap };
            assert!(seg.target_speed().abs() <= cap + 1e-9, "{} exceeds {}", seg, cap);
            assert!(seg.target_speed() != 0.0);
        }

        // A path ending in translation arrives at creep speed, unless the
        // final stretch is too short to ever reach cruise or is a docking move.
        let last = out.last().unwrap();
        if !last.is_point_turn() && !last.is_docking() {
            let cap = if last.is_reverse() { profile.speed_mmps.min(profile.reverse_speed_mmps) } else { profile.speed_mmps };
            let speed = last.target_speed().abs();
            assert!(
                (speed - FINAL_PATH_SEGMENT_SPEED_MMPS).abs() < 1e-9 || speed < cap - 1e-3,
                "path ends at {} mm/s with cruise {}",
                speed,
                cap
            );
        }
    }
}

#[test]
fn test_long_final_line_ends_at_creep() {
    let profile = PathMotionProfile::default();
    let mut path = Path::new();
    path.append_point_turn(Point2D::new(0.0, 0.0), 0.0, FRAC_PI_2, 0.0, 0.0, 0.0, 0.05);
    path.append_line(Point2D::new(0.0, 0.0), Point2D::new(0.0, 500.0), 1.0, 0.0, 0.0);

    let out = apply_motion_profile(&path, &profile);
    assert_eq!(out.len(), 3);
    assert_close(out[1].target_speed(), profile.speed_mmps);
    assert_close(out.last().unwrap().target_speed(), FINAL_PATH_SEGMENT_SPEED_MMPS);
    assert_decel_feasible(&out);
}
