use crate::domains::logger::PlannerLogger;
use std::sync::Arc;

/// Forwards planner messages to `tracing`, so they end up wherever the
/// subscriber installed by the binary sends them.
struct TracingBridge;

impl PlannerLogger for TracingBridge {
    fn info(&self, msg: &str) {
        tracing::info!(target: "lattice_planner", "{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: "lattice_planner", "{}", msg);
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: "lattice_planner", "{}", msg);
    }
}

/// Console-backed logger; the default when no log file is configured.
pub fn init_console_logger() -> Arc<dyn PlannerLogger> {
    Arc::new(TracingBridge)
}
