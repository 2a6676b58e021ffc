use crate::common::{DomainError, DomainResult};
use crate::domains::path_planning::{
    angle_diff, GoalId, Path, PathSegment, Point2D, Pose, SearchEngine, SearchPoll,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl WorkspaceBounds {
    pub fn contains(&self, pose: &Pose) -> bool {
        (self.min_x..=self.max_x).contains(&pose.x) && (self.min_y..=self.max_y).contains(&pose.y)
    }
}

impl Default for WorkspaceBounds {
    fn default() -> Self {
        Self { min_x: -5000.0, max_x: 5000.0, min_y: -5000.0, max_y: 5000.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectSearchConfig {
    pub bounds: WorkspaceBounds,
    pub position_tolerance_mm: f64,
    pub heading_tolerance_rad: f64,
}

impl Default for DirectSearchConfig {
    fn default() -> Self {
        Self {
            bounds: WorkspaceBounds::default(),
            position_tolerance_mm: 1.0,
            heading_tolerance_rad: 0.05,
        }
    }
}

/// Search engine without a map: turn on the spot to face the closest goal,
/// then drive straight at it. Emits one primitive per step.
///
/// Speeds on the emitted segments only carry direction; the planner replaces
/// the magnitudes when it applies the motion profile.
#[derive(Debug, Default)]
pub struct DirectSearchEngine {
    config: DirectSearchConfig,
    pending: VecDeque<PathSegment>,
    path: Path,
    goal: Option<GoalId>,
    expansions: usize,
}

impl DirectSearchEngine {
    pub fn new(config: DirectSearchConfig) -> Self {
        Self { config, ..Self::default() }
    }
}

impl SearchEngine for DirectSearchEngine {
    fn begin(&mut self, start: &Pose, goals: &[Pose]) -> DomainResult<()> {
        self.cancel();
        if !self.config.bounds.contains(start) {
            return Err(DomainError::InvalidGoal {
                reason: format!("start ({:.1}, {:.1}) is outside the workspace", start.x, start.y),
            });
        }

        let Some((goal_id, goal)) = goals
            .iter()
            .enumerate()
            .filter(|(_, goal)| self.goal_is_valid(goal))
            .min_by(|(_, a), (_, b)| start.distance_to(a).total_cmp(&start.distance_to(b)))
        else {
            return Err(DomainError::InvalidGoal { reason: "no goal inside the workspace".to_string() });
        };

        self.goal = Some(goal_id);
        let from = start.position();
        let to = goal.position();
        let tol = self.config.heading_tolerance_rad;

        if from.distance(&to) <= self.config.position_tolerance_mm {
            if angle_diff(goal.heading, start.heading).abs() > tol {
                self.pending.push_back(turn(from, start.heading, goal.heading, tol));
            }
            return Ok(());
        }

        let bearing = (to.y - from.y).atan2(to.x - from.x);
        if angle_diff(bearing, start.heading).abs() > tol {
            self.pending.push_back(turn(from, start.heading, bearing, tol));
        }
        self.pending.push_back(PathSegment::line(from, to, 1.0, 0.0, 0.0));
        Ok(())
    }

    fn step(&mut self) -> SearchPoll {
        let Some(goal) = self.goal else {
            return SearchPoll::Failed("step called before begin".to_string());
        };
        self.expansions += 1;
        if let Some(segment) = self.pending.pop_front() {
            self.path.push(segment);
            if !self.pending.is_empty() {
                return SearchPoll::Running;
            }
        }
        self.goal = None;
        if self.path.is_empty() {
            SearchPoll::NoPath
        } else {
            SearchPoll::Done { path: std::mem::take(&mut self.path), goal }
        }
    }

    fn cancel(&mut self) {
        self.pending.clear();
        self.path.clear();
        self.goal = None;
        self.expansions = 0;
    }

    fn goal_is_valid(&self, goal: &Pose) -> bool {
        self.config.bounds.contains(goal)
    }

    fn expansions(&self) -> usize {
        self.expansions
    }
}

fn turn(pivot: Point2D, from: f64, to: f64, tolerance: f64) -> PathSegment {
    let direction = angle_diff(to, from).signum();
    PathSegment::point_turn(pivot, from, to, direction, 0.0, 0.0, tolerance)
}
