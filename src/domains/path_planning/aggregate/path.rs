use super::segment::PathSegment;
use super::types::Point2D;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Ordered sequence of motion primitives; index order is execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    pub fn new() -> Self {
        Self { segments: Vec::new() }
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn append_line(&mut self, start: Point2D, end: Point2D, target_speed: f64, accel: f64, decel: f64) {
        self.push(PathSegment::line(start, end, target_speed, accel, decel));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn append_arc(
        &mut self,
        center: Point2D,
        radius: f64,
        start_angle: f64,
        sweep: f64,
        target_speed: f64,
        accel: f64,
        decel: f64,
    ) {
        self.push(PathSegment::arc(center, radius, start_angle, sweep, target_speed, accel, decel));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn append_point_turn(
        &mut self,
        pivot: Point2D,
        start_angle: f64,
        target_angle: f64,
        target_rot_speed: f64,
        rot_accel: f64,
        rot_decel: f64,
        angle_tolerance: f64,
    ) {
        self.push(PathSegment::point_turn(
            pivot,
            start_angle,
            target_angle,
            target_rot_speed,
            rot_accel,
            rot_decel,
            angle_tolerance,
        ));
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PathSegment> {
        self.segments.get(index)
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathSegment> {
        self.segments.iter()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Removes up to `n` segments from the end.
    pub fn pop_back(&mut self, n: usize) {
        let keep = self.segments.len().saturating_sub(n);
        self.segments.truncate(keep);
    }

    /// Drops the first `n` segments.
    pub fn trim_front(&mut self, n: usize) {
        let n = n.min(self.segments.len());
        self.segments.drain(..n);
    }

    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(PathSegment::length).sum()
    }

    /// End position and heading of the last segment.
    pub fn end_pose(&self) -> Option<(f64, f64, f64)> {
        self.segments.last().map(PathSegment::end_pose)
    }

    /// Index of the segment closest to `point` and the distance to it.
    /// Ties go to the earlier segment so nothing the robot has not driven
    /// yet is skipped.
    pub fn closest_segment(&self, point: &Point2D) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, seg) in self.segments.iter().enumerate() {
            let d = seg.distance_to(point);
            match best {
                Some((_, best_d)) if d >= best_d - 1e-9 => {}
                _ => best = Some((i, d)),
            }
        }
        best
    }
}

impl Index<usize> for Path {
    type Output = PathSegment;

    fn index(&self, index: usize) -> &Self::Output {
        &self.segments[index]
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathSegment;
    type IntoIter = std::slice::Iter<'a, PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self { segments: iter.into_iter().collect() }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            writeln!(f, "Path segment {} - {}", i, seg)?;
        }
        Ok(())
    }
}
