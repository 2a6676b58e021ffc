use super::motion_profile::{PathMotionProfile, FINAL_PATH_SEGMENT_SPEED_MMPS};
use super::path::Path;
use super::segment::{PathSegment, SegmentKind};
use super::types::angle_diff;

/// Split pieces shorter than this are merged back into their neighbour.
pub const MIN_SPLIT_LENGTH_MM: f64 = 0.1;

/// Speeds closer than this are treated as equal.
const SPEED_EPS: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Boundary {
    /// The robot must come to rest at the end of the segment: path end or
    /// direction reversal.
    Stop,
    /// A point turn follows (or this is one). The turn breaks the kinematic
    /// chain: nothing has to slow down for it and motion after it starts
    /// from rest.
    Free,
    /// Translation continues into the segment with this index.
    Continue(usize),
}

/// Converts a geometric path into a speed-annotated one.
///
/// Each output segment's `target_speed` is the speed commanded when the
/// robot enters it; within a segment the robot slows towards the next
/// segment's commanded speed. Segments that end in a stop are split so the
/// last few millimetres run at [`FINAL_PATH_SEGMENT_SPEED_MMPS`]. The input
/// is never modified and the output has at least as many segments.
pub fn apply_motion_profile(input: &Path, profile: &PathMotionProfile) -> Path {
    let assigned: Vec<PathSegment> = input.iter().map(|seg| assign_limits(seg, profile)).collect();
    let n = assigned.len();
    let boundaries: Vec<Boundary> = (0..n).map(|i| boundary_after(&assigned, i)).collect();

    // Highest speed each segment can be entered with and still slow down in time.
    let mut start_limit = vec![0.0; n];
    for i in (0..n).rev() {
        let seg = &assigned[i];
        let cap = seg.target_speed().abs();
        if seg.is_point_turn() {
            start_limit[i] = cap;
            continue;
        }
        start_limit[i] = match boundaries[i] {
            Boundary::Free => cap,
            Boundary::Stop => cap.min(reachable(0.0, seg.decel(), seg.length())),
            Boundary::Continue(next) => {
                let decel = seg.decel().min(assigned[next].decel());
                cap.min(reachable(start_limit[next], decel, seg.length()))
            }
        };
    }

    // Speed the robot actually has when entering each segment, starting from rest.
    let mut entry = vec![0.0; n];
    for i in 1..n {
        let prev = &assigned[i - 1];
        entry[i] = match boundaries[i - 1] {
            Boundary::Continue(_) => start_limit[i].min(reachable(entry[i - 1], prev.accel(), prev.length())),
            Boundary::Stop | Boundary::Free => 0.0,
        };
    }

    let mut out = Path::new();
    for (i, seg) in assigned.iter().enumerate() {
        if seg.is_point_turn() {
            out.push(*seg);
            continue;
        }
        match boundaries[i] {
            Boundary::Stop => push_stopping_segment(&mut out, seg, start_limit[i], entry[i]),
            Boundary::Free | Boundary::Continue(_) => out.push(with_speed(seg, start_limit[i])),
        }
    }

    tracing::trace!(
        target: "lattice_planner::profile",
        input = n,
        output = out.len(),
        "motion profile applied"
    );
    out
}

/// Copies `seg` with the profile's speed and accel limits for its motion class.
fn assign_limits(seg: &PathSegment, profile: &PathMotionProfile) -> PathSegment {
    let mut assigned = *seg;
    match *seg.kind() {
        SegmentKind::PointTurn { start_angle, target_angle, .. } => {
            let direction = if seg.target_speed() != 0.0 {
                seg.target_speed().signum()
            } else if angle_diff(target_angle, start_angle) < 0.0 {
                -1.0
            } else {
                1.0
            };
            assigned.set_speed_profile(
                direction * profile.point_turn_speed_rad_per_sec.abs(),
                profile.point_turn_accel_rad_per_sec2.abs(),
                profile.point_turn_decel_rad_per_sec2.abs(),
            );
        }
        SegmentKind::Line { .. } | SegmentKind::Arc { .. } => {
            let reverse = seg.is_reverse();
            let (speed, accel, decel) = profile.linear_limits(seg.is_docking(), reverse);
            let direction = if reverse { -1.0 } else { 1.0 };
            assigned.set_speed_profile(direction * speed, accel, decel);
        }
    }
    assigned
}

fn boundary_after(segments: &[PathSegment], i: usize) -> Boundary {
    match segments.get(i + 1) {
        None => Boundary::Stop,
        Some(next) if next.is_point_turn() || segments[i].is_point_turn() => Boundary::Free,
        Some(next) if next.is_reverse() != segments[i].is_reverse() => Boundary::Stop,
        Some(_) => Boundary::Continue(i + 1),
    }
}

/// Speed reachable from `v` over `distance` with constant `rate`. A
/// non-positive rate means the limit is not enforced.
fn reachable(v: f64, rate: f64, distance: f64) -> f64 {
    if rate <= 0.0 {
        return f64::INFINITY;
    }
    (v * v + 2.0 * rate * distance).max(0.0).sqrt()
}

fn with_speed(seg: &PathSegment, speed: f64) -> PathSegment {
    let mut out = *seg;
    let direction = if seg.target_speed() < 0.0 { -1.0 } else { 1.0 };
    out.set_speed_profile(direction * speed, seg.accel(), seg.decel());
    out
}

fn push_stopping_segment(out: &mut Path, seg: &PathSegment, start_limit: f64, entry: f64) {
    let creep = FINAL_PATH_SEGMENT_SPEED_MMPS.min(seg.target_speed().abs());
    let length = seg.length();

    if length <= f64::EPSILON {
        out.push(with_speed(seg, creep));
        return;
    }
    if seg.is_docking() {
        out.push(with_speed(seg, start_limit));
        return;
    }
    if entry <= creep + SPEED_EPS && start_limit < seg.target_speed().abs() - SPEED_EPS {
        // Started from rest and too short to reach cruise: one ramp, no creep tail.
        out.push(with_speed(seg, start_limit));
        return;
    }
    if start_limit <= creep + SPEED_EPS {
        out.push(with_speed(seg, creep));
        return;
    }

    let creep_len = if seg.decel() > 0.0 { creep * creep / (2.0 * seg.decel()) } else { 0.0 };
    let head_len = length - creep_len;
    if head_len < MIN_SPLIT_LENGTH_MM {
        out.push(with_speed(seg, creep));
        return;
    }
    if creep_len < MIN_SPLIT_LENGTH_MM {
        out.push(with_speed(seg, start_limit));
        return;
    }
    match seg.split_at(head_len) {
        Some((head, tail)) => {
            out.push(with_speed(&head, start_limit));
            out.push(with_speed(&tail, creep));
        }
        None => out.push(with_speed(seg, creep)),
    }
}
