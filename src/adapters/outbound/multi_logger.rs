use crate::domains::logger::PlannerLogger;
use log::{Level, LevelFilter};
use std::sync::Arc;

/// Fans planner messages out to several loggers. Each route carries its own
/// level filter, so a file can record everything while the console only sees
/// problems.
#[derive(Default)]
pub struct MultiLogger {
    routes: Vec<(Arc<dyn PlannerLogger>, LevelFilter)>,
}

impl MultiLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `logger`, receiving messages at `max_level` or more severe.
    pub fn route(mut self, logger: Arc<dyn PlannerLogger>, max_level: LevelFilter) -> Self {
        self.routes.push((logger, max_level));
        self
    }

    fn dispatch(&self, level: Level, emit: impl Fn(&dyn PlannerLogger)) {
        for (logger, max_level) in &self.routes {
            if level <= *max_level {
                emit(logger.as_ref());
            }
        }
    }
}

impl PlannerLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.dispatch(Level::Info, |logger| logger.info(msg));
    }

    fn warn(&self, msg: &str) {
        self.dispatch(Level::Warn, |logger| logger.warn(msg));
    }

    fn error(&self, msg: &str) {
        self.dispatch(Level::Error, |logger| logger.error(msg));
    }
}

/// File logger at `level`, with warnings and errors mirrored to the tracing
/// console. Falls back to the console alone when the file cannot be opened.
pub fn init_combined_logger(path: &str, level: log::LevelFilter) -> Arc<dyn PlannerLogger> {
    let console = super::init_console_logger();
    match super::init_file_logger(path, level) {
        Ok(file_logger) => Arc::new(
            MultiLogger::new()
                .route(file_logger, level)
                .route(console, LevelFilter::Warn),
        ),
        Err(e) => {
            console.warn(&e);
            console
        }
    }
}
