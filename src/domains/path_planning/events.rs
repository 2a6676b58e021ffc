use super::aggregate::{GoalId, Pose};
use crate::common::DomainEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a single planning request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PathPlanningEvent {
    PlanRequested {
        request_id: Uuid,
        start: Pose,
        goals: Vec<Pose>,
        timestamp: DateTime<Utc>,
    },
    PlanCompleted {
        request_id: Uuid,
        goal: GoalId,
        segments: usize,
        expansions: usize,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    PlanNotFound {
        request_id: Uuid,
        expansions: usize,
        timestamp: DateTime<Utc>,
    },
    PlanFailed {
        request_id: Uuid,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    PlanCancelled {
        request_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for PathPlanningEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PathPlanningEvent::PlanRequested { .. } => "PlanRequested",
            PathPlanningEvent::PlanCompleted { .. } => "PlanCompleted",
            PathPlanningEvent::PlanNotFound { .. } => "PlanNotFound",
            PathPlanningEvent::PlanFailed { .. } => "PlanFailed",
            PathPlanningEvent::PlanCancelled { .. } => "PlanCancelled",
        }
    }

    fn request_id(&self) -> Uuid {
        match self {
            PathPlanningEvent::PlanRequested { request_id, .. }
            | PathPlanningEvent::PlanCompleted { request_id, .. }
            | PathPlanningEvent::PlanNotFound { request_id, .. }
            | PathPlanningEvent::PlanFailed { request_id, .. }
            | PathPlanningEvent::PlanCancelled { request_id, .. } => *request_id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PathPlanningEvent::PlanRequested { timestamp, .. }
            | PathPlanningEvent::PlanCompleted { timestamp, .. }
            | PathPlanningEvent::PlanNotFound { timestamp, .. }
            | PathPlanningEvent::PlanFailed { timestamp, .. }
            | PathPlanningEvent::PlanCancelled { timestamp, .. } => *timestamp,
        }
    }
}

/// True for events that end a request.
pub fn is_terminal(event: &PathPlanningEvent) -> bool {
    !matches!(event, PathPlanningEvent::PlanRequested { .. })
}
