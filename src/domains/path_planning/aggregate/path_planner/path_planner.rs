use super::completion::{complete_plan, CompletionError, TerminalTurn};
use super::state_machine::{PlanRequest, PlanResult, PlannerStateMachine, SearchOutcome};
use crate::common::{DomainError, DomainResult};
use crate::domains::logger::DynLogger;
use crate::domains::path_planning::actors::PlanningEventPublisher;
use crate::domains::path_planning::aggregate::{
    apply_motion_profile, ComputePathStatus, GoalId, Path, PathMotionProfile, PlannerStatus, Pose,
};
use crate::domains::path_planning::events::PathPlanningEvent;
use crate::domains::path_planning::ports::{PathDebugSink, SearchEngine, SearchPoll};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Granularity of the artificial delay; cancellation is checked between slices.
const DELAY_SLICE: Duration = Duration::from_millis(10);

const DEBUG_PATH_ID: &str = "lattice_plan";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Search steps allowed per request before giving up.
    pub max_expansions: usize,
    /// Hand every valid goal to the engine instead of only the closest one.
    pub multi_goal_planning: bool,
    /// Run searches on the calling thread.
    pub synchronous: bool,
    pub artificial_delay_ms: u64,
    /// Distance from the plan beyond which a stored plan is discarded.
    pub plan_error_for_replan_mm: f64,
    pub terminal_turn: TerminalTurn,
    /// When set, every request is written here as `context_<n>.json`.
    pub context_dump_dir: Option<PathBuf>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_expansions: 30_000_000,
            multi_goal_planning: false,
            synchronous: false,
            artificial_delay_ms: 0,
            plan_error_for_replan_mm: 20.0,
            terminal_turn: TerminalTurn::default(),
            context_dump_dir: None,
        }
    }
}

/// What gets written to a context dump.
#[derive(Debug, Serialize)]
struct PlanningContext<'a> {
    request_id: Uuid,
    search_number: usize,
    start: &'a Pose,
    goals: &'a [Pose],
    goal_ids: &'a [GoalId],
    multi_goal_planning: bool,
}

/// State shared with the worker thread.
struct PlannerCore {
    machine: PlannerStateMachine,
    engine: Mutex<Box<dyn SearchEngine>>,
    config: PlannerConfig,
    logger: DynLogger,
    events: Mutex<Option<PlanningEventPublisher>>,
    artificial_delay_ms: AtomicU64,
    synchronous: AtomicBool,
    searches: AtomicUsize,
}

impl PlannerCore {
    fn engine(&self) -> MutexGuard<'_, Box<dyn SearchEngine>> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: PathPlanningEvent) {
        let events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(publisher) = events.as_ref() {
            if let Err(e) = publisher.publish(event) {
                tracing::debug!(target: "lattice_planner::planner", "event dropped: {}", e);
            }
        }
    }

    /// Runs one request to completion and records the outcome.
    fn run(&self, request: &PlanRequest) -> PlannerStatus {
        self.publish(PathPlanningEvent::PlanRequested {
            request_id: request.id,
            start: request.start,
            goals: request.goals.clone(),
            timestamp: Utc::now(),
        });

        if let Some(dir) = &self.config.context_dump_dir {
            match self.dump_context(dir, request) {
                Ok(file) => tracing::debug!(target: "lattice_planner::planner", "context written to {}", file.display()),
                Err(e) => self.logger.warn(&format!("Failed to dump planning context: {}", e)),
            }
        }

        let started = Instant::now();
        let outcome = self.search(request);
        let elapsed = started.elapsed();
        let expansions = self.engine().expansions();
        let timestamp = Utc::now();

        let event = match &outcome {
            SearchOutcome::Found(result) => {
                self.logger.info(&format!(
                    "Plan {} found: goal {}, {} segments, {} expansions, {} ms",
                    request.id,
                    result.goal,
                    result.path.len(),
                    expansions,
                    elapsed.as_millis()
                ));
                PathPlanningEvent::PlanCompleted {
                    request_id: request.id,
                    goal: result.goal,
                    segments: result.path.len(),
                    expansions,
                    duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    timestamp,
                }
            }
            SearchOutcome::NoPath => {
                self.logger.info(&format!("Plan {}: no path after {} expansions", request.id, expansions));
                PathPlanningEvent::PlanNotFound { request_id: request.id, expansions, timestamp }
            }
            SearchOutcome::Failed(reason) => {
                self.logger.error(&format!("Plan {} failed: {}", request.id, reason));
                PathPlanningEvent::PlanFailed {
                    request_id: request.id,
                    reason: reason.clone(),
                    timestamp,
                }
            }
            SearchOutcome::Cancelled => {
                self.logger.info(&format!("Plan {} cancelled", request.id));
                PathPlanningEvent::PlanCancelled { request_id: request.id, timestamp }
            }
        };

        let status = self.machine.finish(outcome);
        self.publish(event);
        status
    }

    fn search(&self, request: &PlanRequest) -> SearchOutcome {
        if !self.wait_artificial_delay() {
            return SearchOutcome::Cancelled;
        }

        let mut engine = self.engine();
        if let Err(e) = engine.begin(&request.start, &request.goals) {
            return SearchOutcome::Failed(e.to_string());
        }

        let cancel = self.machine.cancel_token();
        loop {
            if cancel.load(Ordering::Acquire) {
                engine.cancel();
                return SearchOutcome::Cancelled;
            }
            if engine.expansions() >= self.config.max_expansions {
                engine.cancel();
                return SearchOutcome::Failed(format!(
                    "expansion limit of {} reached",
                    self.config.max_expansions
                ));
            }
            match engine.step() {
                SearchPoll::Running => continue,
                SearchPoll::NoPath => return SearchOutcome::NoPath,
                SearchPoll::Failed(reason) => return SearchOutcome::Failed(reason),
                SearchPoll::Done { path, .. } if path.is_empty() => return SearchOutcome::NoPath,
                SearchPoll::Done { path, goal } => {
                    let (Some(&goal_id), Some(&goal_pose)) =
                        (request.goal_ids.get(goal), request.goals.get(goal))
                    else {
                        return SearchOutcome::Failed(format!("search returned unknown goal index {}", goal));
                    };
                    return SearchOutcome::Found(PlanResult { path, goal: goal_id, goal_pose });
                }
            }
        }
    }

    /// Sleeps for the configured delay; false when cancelled meanwhile.
    fn wait_artificial_delay(&self) -> bool {
        let delay = Duration::from_millis(self.artificial_delay_ms.load(Ordering::Relaxed));
        let started = Instant::now();
        while let Some(remaining) = delay.checked_sub(started.elapsed()).filter(|d| !d.is_zero()) {
            if self.machine.is_cancelled() {
                return false;
            }
            std::thread::sleep(DELAY_SLICE.min(remaining));
        }
        !self.machine.is_cancelled()
    }

    fn dump_context(&self, dir: &std::path::Path, request: &PlanRequest) -> DomainResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let context = PlanningContext {
            request_id: request.id,
            search_number: request.search_number,
            start: &request.start,
            goals: &request.goals,
            goal_ids: &request.goal_ids,
            multi_goal_planning: self.config.multi_goal_planning,
        };
        let file = dir.join(format!("context_{}.json", request.search_number));
        std::fs::write(&file, serde_json::to_vec_pretty(&context)?)?;
        Ok(file)
    }
}

/// Asynchronous, cancellable planner front-end.
///
/// Searches run on a dedicated worker thread; callers poll
/// [`check_planning_status`](Self::check_planning_status) and fetch the
/// profiled result with [`get_complete_path`](Self::get_complete_path).
/// Dropping the planner stops any running search and joins the worker.
pub struct LatticePlanner {
    core: Arc<PlannerCore>,
    motion_profile: Mutex<PathMotionProfile>,
    debug_sink: Option<Arc<dyn PathDebugSink>>,
    worker: Option<JoinHandle<()>>,
}

impl LatticePlanner {
    pub fn new(
        engine: Box<dyn SearchEngine>,
        config: PlannerConfig,
        logger: DynLogger,
    ) -> DomainResult<Self> {
        let core = Arc::new(PlannerCore {
            machine: PlannerStateMachine::new(),
            engine: Mutex::new(engine),
            artificial_delay_ms: AtomicU64::new(config.artificial_delay_ms),
            synchronous: AtomicBool::new(config.synchronous),
            config,
            logger,
            events: Mutex::new(None),
            searches: AtomicUsize::new(0),
        });

        let worker_core = Arc::clone(&core);
        let worker = std::thread::Builder::new()
            .name("lattice-planner".to_string())
            .spawn(move || {
                while let Some(request) = worker_core.machine.wait_for_request() {
                    worker_core.run(&request);
                }
                tracing::debug!(target: "lattice_planner::planner", "worker stopped");
            })
            .map_err(|e| DomainError::WorkerUnavailable(e.to_string()))?;

        core.logger.info("Lattice planner started");
        Ok(Self {
            core,
            motion_profile: Mutex::new(PathMotionProfile::default()),
            debug_sink: None,
            worker: Some(worker),
        })
    }

    /// Forwards lifecycle events of every request to `publisher`.
    pub fn with_event_publisher(self, publisher: PlanningEventPublisher) -> Self {
        *self.core.events.lock().unwrap_or_else(PoisonError::into_inner) = Some(publisher);
        self
    }

    pub fn with_debug_sink(mut self, sink: Arc<dyn PathDebugSink>) -> Self {
        self.debug_sink = Some(sink);
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.core.config
    }

    pub fn compute_path(&self, start: &Pose, goal: &Pose) -> ComputePathStatus {
        self.compute_path_to_goals(start, std::slice::from_ref(goal))
    }

    /// Starts planning towards any of `goals`. Returns `Error` when a
    /// request is already in flight or no goal is usable.
    pub fn compute_path_to_goals(&self, start: &Pose, goals: &[Pose]) -> ComputePathStatus {
        let core = &self.core;
        if core.machine.is_busy() {
            core.logger.warn("Planning request rejected: planner is busy");
            return ComputePathStatus::Error;
        }

        let valid: Vec<(GoalId, Pose)> = {
            let engine = match core.engine.try_lock() {
                Ok(engine) => engine,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => {
                    core.logger.warn("Planning request rejected: search still running");
                    return ComputePathStatus::Error;
                }
            };
            goals
                .iter()
                .enumerate()
                .filter(|(_, goal)| engine.goal_is_valid(goal))
                .map(|(id, goal)| (id, *goal))
                .collect()
        };

        if valid.is_empty() {
            core.logger.warn(&format!("Planning request rejected: none of {} goals is valid", goals.len()));
            return ComputePathStatus::Error;
        }

        let selected = if core.config.multi_goal_planning {
            valid
        } else {
            let closest = valid
                .into_iter()
                .min_by(|(_, a), (_, b)| start.distance_to(a).total_cmp(&start.distance_to(b)));
            closest.into_iter().collect()
        };

        let request = PlanRequest {
            id: Uuid::new_v4(),
            search_number: core.searches.fetch_add(1, Ordering::Relaxed),
            start: *start,
            goal_ids: selected.iter().map(|(id, _)| *id).collect(),
            goals: selected.iter().map(|(_, goal)| *goal).collect(),
        };
        if core.synchronous.load(Ordering::Relaxed) {
            if !core.machine.begin_inline() {
                core.logger.warn("Planning request rejected: planner is busy");
                return ComputePathStatus::Error;
            }
            core.logger.info(&format!("Planning {} synchronously to {} goal(s)", request.id, request.goals.len()));
            core.run(&request);
            return ComputePathStatus::Running;
        }

        let id = request.id;
        let goal_count = request.goals.len();
        if !core.machine.submit(request) {
            core.logger.warn("Planning request rejected: planner is busy");
            return ComputePathStatus::Error;
        }
        core.logger.info(&format!("Planning {} started to {} goal(s)", id, goal_count));
        ComputePathStatus::Running
    }

    pub fn check_planning_status(&self) -> PlannerStatus {
        self.core.machine.status()
    }

    /// Requests cancellation of the running search without waiting for it.
    pub fn stop_planning(&self) {
        self.core.machine.request_stop();
    }

    /// Copies the completed plan into `path`, trimmed to the robot's current
    /// pose and with the motion profile applied. Returns false when no plan is
    /// available. A robot too far from the plan invalidates it and moves the
    /// status to `Error`.
    pub fn get_complete_path(
        &self,
        current_pose: &Pose,
        path: &mut Path,
        selected_goal: Option<&mut GoalId>,
    ) -> bool {
        let Some(result) = self.core.machine.completed_plan() else {
            return false;
        };

        let config = &self.core.config;
        let completed = match complete_plan(
            &result.path,
            current_pose,
            &result.goal_pose,
            config.plan_error_for_replan_mm,
            &config.terminal_turn,
        ) {
            Ok(completed) => completed,
            Err(CompletionError::OffPlan { distance_mm }) => {
                self.core.logger.warn(&format!(
                    "Robot is {:.1} mm from the plan (limit {:.1} mm), replan needed",
                    distance_mm, config.plan_error_for_replan_mm
                ));
                self.core.machine.invalidate();
                return false;
            }
            Err(CompletionError::Empty) => {
                self.core.logger.warn("Completed plan has nothing left to drive");
                return false;
            }
        };

        let profile = self.motion_profile();
        self.apply_motion_profile(&completed, &profile, path);
        if let Some(goal) = selected_goal {
            *goal = result.goal;
        }
        if let Some(sink) = &self.debug_sink {
            sink.draw_path(DEBUG_PATH_ID, path);
        }
        true
    }

    /// Writes `input` with `profile` applied into `output`.
    pub fn apply_motion_profile(&self, input: &Path, profile: &PathMotionProfile, output: &mut Path) {
        *output = apply_motion_profile(input, profile);
    }

    pub fn set_motion_profile(&self, profile: PathMotionProfile) {
        *self.motion_profile.lock().unwrap_or_else(PoisonError::into_inner) = profile;
    }

    pub fn motion_profile(&self) -> PathMotionProfile {
        self.motion_profile.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_synchronous(&self, synchronous: bool) {
        self.core.synchronous.store(synchronous, Ordering::Relaxed);
    }

    /// Delay the worker waits before each search. Meant for exercising
    /// cancellation in tests.
    pub fn set_artificial_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.core.artificial_delay_ms.store(millis, Ordering::Relaxed);
    }
}

impl Drop for LatticePlanner {
    fn drop(&mut self) {
        self.core.machine.shutdown();
        if let Some(sink) = &self.debug_sink {
            sink.erase_path(DEBUG_PATH_ID);
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!(target: "lattice_planner::planner", "worker thread panicked");
            }
        }
        self.core.logger.info("Lattice planner stopped");
    }
}
