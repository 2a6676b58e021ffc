use crate::domains::path_planning::aggregate::{GoalId, Path, PlannerStatus, Pose};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// One planning request as handed to the worker.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub id: Uuid,
    pub search_number: usize,
    pub start: Pose,
    /// Goals passed to the search engine.
    pub goals: Vec<Pose>,
    /// Index of each entry of `goals` in the caller's original goal list.
    pub goal_ids: Vec<GoalId>,
}

/// A completed search.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanResult {
    pub path: Path,
    pub goal: GoalId,
    pub goal_pose: Pose,
}

/// How a request ended, as reported by whoever ran the search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(PlanResult),
    NoPath,
    Failed(String),
    Cancelled,
}

#[derive(Debug)]
struct PlannerState {
    status: PlannerStatus,
    pending: Option<PlanRequest>,
    busy: bool,
    result: Option<PlanResult>,
    shutdown: bool,
}

/// Status and result slot shared between the polling side and the worker.
///
/// Every transition happens under one mutex, so the poller never sees a
/// status without its matching result. The cancellation token lives outside
/// the lock so the search loop can check it without contention.
#[derive(Debug)]
pub struct PlannerStateMachine {
    state: Mutex<PlannerState>,
    wake: Condvar,
    cancel: Arc<AtomicBool>,
}

impl Default for PlannerStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlannerStateMachine {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PlannerState {
                status: PlannerStatus::Error,
                pending: None,
                busy: false,
                result: None,
                shutdown: false,
            }),
            wake: Condvar::new(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PlannerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> PlannerStatus {
        self.lock().status
    }

    /// True while a request is queued or being searched.
    pub fn is_busy(&self) -> bool {
        let state = self.lock();
        state.busy || state.pending.is_some()
    }

    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Queues `request` for the worker. Refused while another request is
    /// queued or running.
    pub fn submit(&self, request: PlanRequest) -> bool {
        let mut state = self.lock();
        if !Self::start_locked(&mut state, &self.cancel) {
            return false;
        }
        state.pending = Some(request);
        drop(state);
        self.wake.notify_one();
        true
    }

    /// Marks a request as running on the calling thread instead of the worker.
    pub fn begin_inline(&self) -> bool {
        let mut state = self.lock();
        if !Self::start_locked(&mut state, &self.cancel) {
            return false;
        }
        state.busy = true;
        true
    }

    fn start_locked(state: &mut PlannerState, cancel: &AtomicBool) -> bool {
        if state.busy || state.pending.is_some() || state.shutdown {
            return false;
        }
        cancel.store(false, Ordering::Release);
        state.status = PlannerStatus::Running;
        state.result = None;
        true
    }

    /// Blocks the worker until a request arrives. `None` means shut down.
    pub fn wait_for_request(&self) -> Option<PlanRequest> {
        let mut state = self.lock();
        loop {
            if state.shutdown {
                return None;
            }
            if let Some(request) = state.pending.take() {
                state.busy = true;
                return Some(request);
            }
            state = self.wake.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Publishes the outcome of the running request. A stop requested while
    /// it ran wins over whatever the search produced.
    pub fn finish(&self, outcome: SearchOutcome) -> PlannerStatus {
        let mut state = self.lock();
        state.busy = false;
        let outcome = if self.is_cancelled() { SearchOutcome::Cancelled } else { outcome };
        state.status = match outcome {
            SearchOutcome::Found(result) => {
                state.result = Some(result);
                PlannerStatus::CompleteWithPlan
            }
            SearchOutcome::NoPath => PlannerStatus::CompleteNoPlan,
            SearchOutcome::Failed(_) | SearchOutcome::Cancelled => PlannerStatus::Error,
        };
        state.status
    }

    /// Asks the running search to stop. Does not wait for it.
    pub fn request_stop(&self) {
        self.cancel.store(true, Ordering::Release);
        let mut state = self.lock();
        if state.pending.take().is_some() {
            state.status = PlannerStatus::Error;
        }
    }

    /// Copy of the last completed plan, if the status says there is one.
    pub fn completed_plan(&self) -> Option<PlanResult> {
        let state = self.lock();
        match state.status {
            PlannerStatus::CompleteWithPlan => state.result.clone(),
            _ => None,
        }
    }

    /// Drops the stored plan and reports an error to the poller.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        if !state.busy && state.pending.is_none() {
            state.status = PlannerStatus::Error;
            state.result = None;
        }
    }

    pub fn shutdown(&self) {
        self.cancel.store(true, Ordering::Release);
        self.lock().shutdown = true;
        self.wake.notify_all();
    }
}
