use crate::domains::path_planning::{Path, PathDebugSink};

/// Debug sink that logs drawn paths at debug level instead of rendering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDebugSink;

impl PathDebugSink for TracingDebugSink {
    fn draw_path(&self, id: &str, path: &Path) {
        tracing::debug!(
            target: "lattice_planner::viz",
            id,
            segments = path.len(),
            length_mm = path.total_length(),
            "draw path\n{}",
            path
        );
    }

    fn erase_path(&self, id: &str) {
        tracing::debug!(target: "lattice_planner::viz", id, "erase path");
    }
}
