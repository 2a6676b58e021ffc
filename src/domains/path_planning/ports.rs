use super::aggregate::{GoalId, Path, Pose};
use crate::common::DomainResult;

/// Result of advancing a search by one step.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPoll {
    /// More work to do; call `step` again.
    Running,
    /// A geometric path to `goals[goal]` was found.
    Done { path: Path, goal: GoalId },
    /// The search space was exhausted without reaching any goal.
    NoPath,
    Failed(String),
}

/// Port for the graph search the planner drives.
///
/// The planner calls `begin` once per request and then `step` until it
/// returns something other than [`SearchPoll::Running`], checking for
/// cancellation between steps. Implementations should keep steps short so
/// cancellation is noticed promptly.
pub trait SearchEngine: Send + 'static {
    fn begin(&mut self, start: &Pose, goals: &[Pose]) -> DomainResult<()>;

    fn step(&mut self) -> SearchPoll;

    /// Drops whatever state the current search holds.
    fn cancel(&mut self) {}

    /// Cheap pre-check used to filter goals before a search starts.
    fn goal_is_valid(&self, _goal: &Pose) -> bool {
        true
    }

    /// Number of steps taken by the current search.
    fn expansions(&self) -> usize;
}

/// Optional write-only visualization port.
pub trait PathDebugSink: Send + Sync {
    fn draw_path(&self, id: &str, path: &Path);
    fn erase_path(&self, id: &str);
}
