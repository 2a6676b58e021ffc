use crate::domains::path_planning::aggregate::{angle_diff, Path, Point2D, Pose};
use serde::{Deserialize, Serialize};

/// Point turn appended at the end of a plan to face the goal heading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalTurn {
    pub speed_rad_per_sec: f64,
    pub accel_rad_per_sec2: f64,
    pub decel_rad_per_sec2: f64,
    pub tolerance_deg: f64,
}

impl Default for TerminalTurn {
    fn default() -> Self {
        Self {
            speed_rad_per_sec: 2.0,
            accel_rad_per_sec2: 10.0,
            decel_rad_per_sec2: 10.0,
            tolerance_deg: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompletionError {
    /// The robot is further than the replan threshold from every segment.
    OffPlan { distance_mm: f64 },
    /// Nothing left to drive after trimming.
    Empty,
}

/// Prepares a stored plan for execution from `robot`'s current pose: drops
/// segments already driven, then replaces any trailing point turns with a
/// single turn onto the goal heading.
pub fn complete_plan(
    plan: &Path,
    robot: &Pose,
    goal: &Pose,
    replan_threshold_mm: f64,
    turn: &TerminalTurn,
) -> Result<Path, CompletionError> {
    let (closest, distance_mm) = plan.closest_segment(&robot.position()).ok_or(CompletionError::Empty)?;
    if distance_mm >= replan_threshold_mm {
        return Err(CompletionError::OffPlan { distance_mm });
    }

    let mut path = plan.clone();
    path.trim_front(closest);

    let trailing_turns = path.iter().rev().take_while(|seg| seg.is_point_turn()).count();
    path.pop_back(trailing_turns);

    let (x, y, heading) = path.end_pose().unwrap_or((robot.x, robot.y, robot.heading));
    let error = angle_diff(goal.heading, heading);
    if error.abs() > turn.tolerance_deg.to_radians() {
        path.append_point_turn(
            Point2D::new(x, y),
            heading,
            goal.heading,
            turn.speed_rad_per_sec.abs().copysign(error),
            turn.accel_rad_per_sec2,
            turn.decel_rad_per_sec2,
            turn.tolerance_deg.to_radians(),
        );
    }

    if path.is_empty() {
        return Err(CompletionError::Empty);
    }
    Ok(path)
}
