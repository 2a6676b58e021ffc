// Forwards planner lifecycle events to whoever listens on the channel.
use super::events::PathPlanningEvent;
use tokio::sync::mpsc;

/// Publishes events from the planner worker thread. Sending never blocks:
/// when the channel is full or closed the event is dropped.
#[derive(Clone)]
pub struct PlanningEventPublisher {
    event_sender: mpsc::Sender<PathPlanningEvent>,
}

impl PlanningEventPublisher {
    pub fn new(event_sender: mpsc::Sender<PathPlanningEvent>) -> Self {
        Self { event_sender }
    }

    /// Publisher plus the receiving end of a fresh channel.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PathPlanningEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    pub fn publish(&self, event: PathPlanningEvent) -> Result<(), String> {
        self.event_sender
            .try_send(event)
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}
