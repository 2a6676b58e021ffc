pub mod motion_profile;
pub mod path;
pub mod path_planner;
pub mod profile_applier;
pub mod segment;
pub mod types;

// Re-export all public types for convenience
pub use motion_profile::*;
pub use path::*;
pub use path_planner::*;
pub use profile_applier::*;
pub use segment::*;
pub use types::*;
