use crate::adapters::outbound::DirectSearchConfig;
use crate::domains::path_planning::{PathMotionProfile, PlannerConfig};
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of environment variables that override file settings, e.g.
/// `LATTICE_PLANNER__PLANNER__MAX_EXPANSIONS=1000`.
pub const ENV_PREFIX: &str = "LATTICE_PLANNER";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub planner: PlannerConfig,
    pub motion_profile: PathMotionProfile,
    pub search: DirectSearchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing-subscriber` env-filter directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Also write planner messages to this file through `fast_log`.
    pub file: Option<String>,
    /// Queue planner messages and forward them from a background task.
    pub buffered: bool,
    pub buffer_capacity: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file: None,
            buffered: false,
            buffer_capacity: 256,
        }
    }
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Layers an optional TOML file and `LATTICE_PLANNER__*` environment
    /// variables over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = ::config::Config::try_from(&Config::default())?;
        let mut builder = ::config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).format(::config::FileFormat::Toml));
        }
        builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .context("failed to load planner configuration")
    }

    /// Rejects settings the planner cannot run with.
    pub fn validate(&self) -> Result<()> {
        let profile = &self.motion_profile;
        for (name, value) in [
            ("motion_profile.speed_mmps", profile.speed_mmps),
            ("motion_profile.reverse_speed_mmps", profile.reverse_speed_mmps),
            ("motion_profile.dock_speed_mmps", profile.dock_speed_mmps),
            ("motion_profile.point_turn_speed_rad_per_sec", profile.point_turn_speed_rad_per_sec),
        ] {
            ensure!(value.is_finite() && value > 0.0, "{} must be positive, got {}", name, value);
        }
        ensure!(
            self.planner.plan_error_for_replan_mm > 0.0,
            "planner.plan_error_for_replan_mm must be positive"
        );
        ensure!(self.planner.max_expansions > 0, "planner.max_expansions must be at least 1");
        let bounds = &self.search.bounds;
        ensure!(
            bounds.min_x < bounds.max_x && bounds.min_y < bounds.max_y,
            "search.bounds is empty: x {}..{}, y {}..{}",
            bounds.min_x,
            bounds.max_x,
            bounds.min_y,
            bounds.max_y
        );
        ensure!(self.logging.buffer_capacity > 0, "logging.buffer_capacity must be at least 1");
        Ok(())
    }
}
