mod common;

use common::quiet_logger;
use lattice_planner::application::PathPlanningService;
use lattice_planner::common::{ApplicationError, DomainResult};
use lattice_planner::domains::path_planning::{
    LatticePlanner, PlannerConfig, PlannerStatus, Pose, SearchEngine, SearchPoll,
};
use lattice_planner::Config;
use std::time::Duration;

/// Engine whose search never finishes.
struct EndlessEngine {
    steps: usize,
}

impl SearchEngine for EndlessEngine {
    fn begin(&mut self, _start: &Pose, _goals: &[Pose]) -> DomainResult<()> {
        self.steps = 0;
        Ok(())
    }

    fn step(&mut self) -> SearchPoll {
        std::thread::sleep(Duration::from_millis(1));
        self.steps += 1;
        SearchPoll::Running
    }

    fn expansions(&self) -> usize {
        self.steps
    }
}

#[tokio::test]
async fn test_service_plans_with_default_config() {
    let service = PathPlanningService::from_config(&Config::default(), quiet_logger()).unwrap();
    let start = Pose::new(0.0, 0.0, 0.0);
    let goal = Pose::new(600.0, 0.0, 0.0);

    let planned = service
        .plan(&start, &goal, Duration::from_secs(2))
        .await
        .unwrap()
        .expect("a straight run should always be found");
    assert_eq!(planned.goal, 0);
    assert!(!planned.path.is_empty());
    assert!((planned.path.total_length() - 600.0).abs() < 1e-6);
    assert!(planned.path.iter().all(|s| s.target_speed() > 0.0));
}

#[test]
fn test_service_rejects_invalid_config() {
    let mut config = Config::default();
    config.motion_profile.speed_mmps = 0.0;
    let err = PathPlanningService::from_config(&config, quiet_logger()).err().unwrap();
    assert!(matches!(err, ApplicationError::Configuration(_)));
    assert!(err.to_string().contains("motion_profile.speed_mmps"));
}

#[tokio::test]
async fn test_service_reports_no_path() {
    let service = PathPlanningService::from_config(&Config::default(), quiet_logger()).unwrap();
    let here = Pose::new(10.0, 10.0, 0.0);
    let result = service.plan(&here, &here, Duration::from_secs(2)).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_service_rejects_unreachable_goal() {
    let service = PathPlanningService::from_config(&Config::default(), quiet_logger()).unwrap();
    let err = service
        .plan(&Pose::default(), &Pose::new(1.0e6, 0.0, 0.0), Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Rejected(_)));
}

#[tokio::test]
async fn test_service_times_out_and_stops_search() {
    let planner = LatticePlanner::new(
        Box::new(EndlessEngine { steps: 0 }),
        PlannerConfig::default(),
        quiet_logger(),
    )
    .unwrap();
    let service = PathPlanningService::new(planner).with_poll_interval(Duration::from_millis(2));

    let err = service
        .plan(&Pose::default(), &Pose::new(100.0, 0.0, 0.0), Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Timeout(_)));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(service.planner().check_planning_status(), PlannerStatus::Error);
}
