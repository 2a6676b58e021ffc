use crate::adapters::outbound::DirectSearchEngine;
use crate::common::{ApplicationError, ApplicationResult};
use crate::config::Config;
use crate::domains::logger::DynLogger;
use crate::domains::path_planning::{
    ComputePathStatus, GoalId, LatticePlanner, Path, PlannerStatus, Pose,
};
use std::time::{Duration, Instant};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// A profiled plan ready to hand to the path follower.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPath {
    pub path: Path,
    pub goal: GoalId,
}

/// Async front door to the planner: submits a request and waits for it
/// without blocking the runtime.
pub struct PathPlanningService {
    planner: LatticePlanner,
    poll_interval: Duration,
}

impl PathPlanningService {
    pub fn new(planner: LatticePlanner) -> Self {
        Self { planner, poll_interval: DEFAULT_POLL_INTERVAL }
    }

    /// Planner backed by [`DirectSearchEngine`], configured from `config`.
    /// Invalid settings are reported as [`ApplicationError::Configuration`].
    pub fn from_config(config: &Config, logger: DynLogger) -> ApplicationResult<Self> {
        config.validate()?;
        let engine = Box::new(DirectSearchEngine::new(config.search));
        let planner = LatticePlanner::new(engine, config.planner.clone(), logger)?;
        planner.set_motion_profile(config.motion_profile.clone());
        Ok(Self::new(planner))
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn planner(&self) -> &LatticePlanner {
        &self.planner
    }

    pub async fn plan(&self, start: &Pose, goal: &Pose, timeout: Duration) -> ApplicationResult<Option<PlannedPath>> {
        self.plan_to_goals(start, std::slice::from_ref(goal), timeout).await
    }

    /// Plans from `start` to any of `goals`. `Ok(None)` means the search
    /// finished without finding a path. On timeout the search is stopped.
    pub async fn plan_to_goals(
        &self,
        start: &Pose,
        goals: &[Pose],
        timeout: Duration,
    ) -> ApplicationResult<Option<PlannedPath>> {
        if self.planner.compute_path_to_goals(start, goals) == ComputePathStatus::Error {
            return Err(ApplicationError::Rejected(
                "planner busy or no valid goal".to_string(),
            ));
        }

        let started = Instant::now();
        loop {
            match self.planner.check_planning_status() {
                PlannerStatus::Running => {
                    if started.elapsed() >= timeout {
                        self.planner.stop_planning();
                        return Err(ApplicationError::Timeout(timeout));
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
                PlannerStatus::CompleteWithPlan => {
                    let mut path = Path::new();
                    let mut goal = 0;
                    if self.planner.get_complete_path(start, &mut path, Some(&mut goal)) {
                        tracing::debug!(target: "lattice_planner::service", goal, segments = path.len(), "plan ready");
                        return Ok(Some(PlannedPath { path, goal }));
                    }
                    return Err(ApplicationError::PlanningFailed(
                        "completed plan could not be prepared for execution".to_string(),
                    ));
                }
                PlannerStatus::CompleteNoPlan => return Ok(None),
                PlannerStatus::Error => {
                    return Err(ApplicationError::PlanningFailed(
                        "planner reported an error".to_string(),
                    ))
                }
            }
        }
    }
}
