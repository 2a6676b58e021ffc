use crate::domains::logger::PlannerLogger;
use std::sync::Arc;
use tokio::sync::mpsc;

enum Level {
    Info,
    Warn,
    Error,
}

struct LogMessage {
    level: Level,
    msg: String,
}

struct BufferedLogger {
    sender: mpsc::Sender<LogMessage>,
}

impl BufferedLogger {
    fn send(&self, level: Level, msg: &str) {
        // Drop on full rather than stall the planner worker.
        let _ = self.sender.try_send(LogMessage { level, msg: msg.to_string() });
    }
}

impl PlannerLogger for BufferedLogger {
    fn info(&self, msg: &str) {
        self.send(Level::Info, msg);
    }

    fn warn(&self, msg: &str) {
        self.send(Level::Warn, msg);
    }

    fn error(&self, msg: &str) {
        self.send(Level::Error, msg);
    }
}

/// Non-blocking logger: messages are queued and forwarded to `bridge` from
/// a background task. Must be called inside a tokio runtime.
pub fn init_buffered_logger(bridge: Arc<dyn PlannerLogger>, capacity: usize) -> Arc<dyn PlannerLogger> {
    let (tx, mut rx) = mpsc::channel::<LogMessage>(capacity.max(1));

    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match msg.level {
                Level::Info => bridge.info(&msg.msg),
                Level::Warn => bridge.warn(&msg.msg),
                Level::Error => bridge.error(&msg.msg),
            }
        }
    });

    Arc::new(BufferedLogger { sender: tx })
}
