use lattice_planner::adapters::outbound::{
    init_buffered_logger, init_combined_logger, init_console_logger, DirectSearchEngine, TracingDebugSink,
};
use lattice_planner::application::PathPlanningService;
use lattice_planner::common::EventEnvelope;
use lattice_planner::domains::path_planning::{is_terminal, LatticePlanner, PlanningEventPublisher, Pose};
use lattice_planner::domains::DynLogger;
use lattice_planner::Config;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config_path = std::env::args().nth(1).map(std::path::PathBuf::from);
    let config = Config::load(config_path.as_deref())?;
    config.validate()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting lattice planner");
    info!("Motion profile: {:?}", config.motion_profile);

    let base_logger: DynLogger = match &config.logging.file {
        Some(path) => init_combined_logger(path, log::LevelFilter::Info),
        None => init_console_logger(),
    };
    let logger = if config.logging.buffered {
        init_buffered_logger(base_logger, config.logging.buffer_capacity)
    } else {
        base_logger
    };

    let (publisher, mut events) = PlanningEventPublisher::channel(64);
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let envelope = match EventEnvelope::new(&event, "lattice-planner") {
                Ok(envelope) => envelope,
                Err(e) => {
                    warn!("Failed to serialize event: {}", e);
                    continue;
                }
            };
            if is_terminal(&event) {
                info!(target: "lattice_planner::events", "{} {}", envelope.event_type, envelope.event_data);
            } else {
                debug!(target: "lattice_planner::events", "{} {}", envelope.event_type, envelope.event_data);
            }
        }
    });

    let planner = LatticePlanner::new(
        Box::new(DirectSearchEngine::new(config.search)),
        config.planner.clone(),
        logger,
    )?
    .with_event_publisher(publisher)
    .with_debug_sink(Arc::new(TracingDebugSink));
    planner.set_motion_profile(config.motion_profile.clone());
    let service = PathPlanningService::new(planner);

    let start = Pose::new(0.0, 0.0, 0.0);
    let goals = [Pose::new(400.0, 300.0, std::f64::consts::FRAC_PI_2), Pose::new(-200.0, 0.0, 0.0)];

    match service.plan_to_goals(&start, &goals, Duration::from_secs(5)).await {
        Ok(Some(planned)) => {
            info!("Plan to goal {} ({} segments)", planned.goal, planned.path.len());
            print!("{}", planned.path);
        }
        Ok(None) => warn!("No path found"),
        Err(e) => error!("Planning failed: {}", e),
    }

    info!("Shutting down lattice planner");
    Ok(())
}
