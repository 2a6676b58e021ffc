use crate::domains::logger::{FileLogger, PlannerLogger};
use std::sync::Arc;

/// Sets up `fast_log` to write to `path` and returns a logger that feeds it.
/// `fast_log` installs a global backend, so this succeeds at most once per
/// process.
pub fn init_file_logger(path: &str, level: log::LevelFilter) -> Result<Arc<dyn PlannerLogger>, String> {
    FileLogger::init(path, level).map_err(|e| format!("Failed to initialize fast_log: {}", e))?;
    Ok(Arc::new(FileLogger))
}
