pub mod completion;
pub mod path_planner;
pub mod state_machine;

pub use completion::*;
pub use path_planner::*;
pub use state_machine::*;
