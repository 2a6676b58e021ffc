use chrono::Utc;
use log::{error as log_error, info as log_info, warn as log_warn};
use std::sync::Arc;

/// Logging port the planner reports its lifecycle through.
/// Non-fallible from the planner's point of view; adapters swallow their own errors.
pub trait PlannerLogger: Send + Sync + 'static {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

pub type DynLogger = Arc<dyn PlannerLogger>;

/// File-backed logger writing through `fast_log`.
pub struct FileLogger;

impl FileLogger {
    /// Installs `fast_log` as the global `log` backend, appending to `path`
    /// and echoing to the console.
    pub fn init(path: &str, level: log::LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
        fast_log::init(fast_log::config::Config::new().console().file(path).level(level))?;
        Ok(())
    }
}

impl PlannerLogger for FileLogger {
    fn info(&self, msg: &str) {
        log_info!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn warn(&self, msg: &str) {
        log_warn!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn error(&self, msg: &str) {
        log_error!("{} - {}", Utc::now().to_rfc3339(), msg);
    }
}
