use super::types::{angle_diff, normalize_angle, Point2D};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;

/// Geometry of one drivable primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SegmentKind {
    Line {
        start: Point2D,
        end: Point2D,
    },
    /// Positive sweep turns counter-clockwise.
    Arc {
        center: Point2D,
        radius: f64,
        start_angle: f64,
        sweep: f64,
    },
    PointTurn {
        pivot: Point2D,
        start_angle: f64,
        target_angle: f64,
        angle_tolerance: f64,
    },
}

/// One motion primitive plus its speed profile.
///
/// `target_speed` is signed: for lines and arcs the sign is the driving
/// direction (negative = reverse), for point turns it is the rotation
/// direction (positive = CCW) and the magnitude is in rad/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    kind: SegmentKind,
    target_speed: f64,
    accel: f64,
    decel: f64,
    is_docking: bool,
    length: f64,
}

impl PathSegment {
    pub fn line(start: Point2D, end: Point2D, target_speed: f64, accel: f64, decel: f64) -> Self {
        Self::from_kind(SegmentKind::Line { start, end }, target_speed, accel, decel)
    }

    pub fn arc(
        center: Point2D,
        radius: f64,
        start_angle: f64,
        sweep: f64,
        target_speed: f64,
        accel: f64,
        decel: f64,
    ) -> Self {
        debug_assert!(radius >= 0.0, "arc radius must be non-negative");
        Self::from_kind(
            SegmentKind::Arc { center, radius, start_angle, sweep },
            target_speed,
            accel,
            decel,
        )
    }

    pub fn point_turn(
        pivot: Point2D,
        start_angle: f64,
        target_angle: f64,
        target_rot_speed: f64,
        rot_accel: f64,
        rot_decel: f64,
        angle_tolerance: f64,
    ) -> Self {
        Self::from_kind(
            SegmentKind::PointTurn { pivot, start_angle, target_angle, angle_tolerance },
            target_rot_speed,
            rot_accel,
            rot_decel,
        )
    }

    pub fn from_kind(kind: SegmentKind, target_speed: f64, accel: f64, decel: f64) -> Self {
        debug_assert!(accel >= 0.0 && decel >= 0.0, "accel/decel are magnitudes");
        Self {
            kind,
            target_speed,
            accel,
            decel,
            is_docking: false,
            length: kind_length(&kind),
        }
    }

    /// Marks the segment as part of a final docking approach.
    pub fn docking(mut self, is_docking: bool) -> Self {
        self.is_docking = is_docking;
        self
    }

    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    pub fn target_speed(&self) -> f64 {
        self.target_speed
    }

    pub fn accel(&self) -> f64 {
        self.accel
    }

    pub fn decel(&self) -> f64 {
        self.decel
    }

    pub fn is_docking(&self) -> bool {
        self.is_docking
    }

    /// Arclength in mm; zero for point turns.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn is_point_turn(&self) -> bool {
        matches!(self.kind, SegmentKind::PointTurn { .. })
    }

    pub fn is_reverse(&self) -> bool {
        !self.is_point_turn() && self.target_speed < 0.0
    }

    pub fn set_speed_profile(&mut self, target_speed: f64, accel: f64, decel: f64) {
        debug_assert!(accel >= 0.0 && decel >= 0.0, "accel/decel are magnitudes");
        self.target_speed = target_speed;
        self.accel = accel;
        self.decel = decel;
    }

    pub fn start_point(&self) -> Point2D {
        match self.kind {
            SegmentKind::Line { start, .. } => start,
            SegmentKind::Arc { center, radius, start_angle, .. } => Point2D::new(
                center.x + radius * start_angle.cos(),
                center.y + radius * start_angle.sin(),
            ),
            SegmentKind::PointTurn { pivot, .. } => pivot,
        }
    }

    /// Heading of the robot when it enters the segment.
    pub fn start_heading(&self) -> f64 {
        match self.kind {
            SegmentKind::Line { .. } => self.end_pose().2,
            SegmentKind::Arc { sweep, .. } => normalize_angle(self.end_pose().2 - sweep),
            SegmentKind::PointTurn { start_angle, .. } => start_angle,
        }
    }

    /// End position and heading. Reverse lines and arcs face away from the
    /// direction of travel.
    pub fn end_pose(&self) -> (f64, f64, f64) {
        let flip = if self.target_speed < 0.0 { PI } else { 0.0 };
        match self.kind {
            SegmentKind::Line { start, end } => {
                let heading = (end.y - start.y).atan2(end.x - start.x) + flip;
                (end.x, end.y, normalize_angle(heading))
            }
            SegmentKind::Arc { center, radius, start_angle, sweep } => {
                let end_angle = start_angle + sweep;
                let tangent = if sweep > 0.0 { end_angle + FRAC_PI_2 } else { end_angle - FRAC_PI_2 };
                (
                    center.x + radius * end_angle.cos(),
                    center.y + radius * end_angle.sin(),
                    normalize_angle(tangent + flip),
                )
            }
            SegmentKind::PointTurn { pivot, target_angle, .. } => (pivot.x, pivot.y, target_angle),
        }
    }

    /// Splits the segment `distance` mm along its arclength. Point turns and
    /// out-of-range distances are not split.
    pub fn split_at(&self, distance: f64) -> Option<(PathSegment, PathSegment)> {
        if distance <= 0.0 || distance >= self.length {
            return None;
        }
        let frac = distance / self.length;
        let (head, tail) = match self.kind {
            SegmentKind::Line { start, end } => {
                let mid = start.lerp(&end, frac);
                (
                    SegmentKind::Line { start, end: mid },
                    SegmentKind::Line { start: mid, end },
                )
            }
            SegmentKind::Arc { center, radius, start_angle, sweep } => {
                let head_sweep = sweep * frac;
                (
                    SegmentKind::Arc { center, radius, start_angle, sweep: head_sweep },
                    SegmentKind::Arc {
                        center,
                        radius,
                        start_angle: start_angle + head_sweep,
                        sweep: sweep - head_sweep,
                    },
                )
            }
            SegmentKind::PointTurn { .. } => return None,
        };
        let make = |kind| {
            PathSegment::from_kind(kind, self.target_speed, self.accel, self.decel).docking(self.is_docking)
        };
        Some((make(head), make(tail)))
    }

    /// Shortest distance from `point` to the segment's geometry.
    pub fn distance_to(&self, point: &Point2D) -> f64 {
        match self.kind {
            SegmentKind::Line { start, end } => {
                let len_sq = start.distance_sq(&end);
                if len_sq <= f64::EPSILON {
                    return point.distance(&start);
                }
                let t = ((point.x - start.x) * (end.x - start.x) + (point.y - start.y) * (end.y - start.y))
                    / len_sq;
                point.distance(&start.lerp(&end, t.clamp(0.0, 1.0)))
            }
            SegmentKind::Arc { center, radius, start_angle, sweep } => {
                let bearing = (point.y - center.y).atan2(point.x - center.x);
                let into_arc = angle_diff(bearing, start_angle);
                let within = if sweep >= 0.0 {
                    let a = if into_arc < 0.0 { into_arc + 2.0 * PI } else { into_arc };
                    a <= sweep
                } else {
                    let a = if into_arc > 0.0 { into_arc - 2.0 * PI } else { into_arc };
                    a >= sweep
                };
                if within {
                    (point.distance(&center) - radius).abs()
                } else {
                    let (ex, ey, _) = self.end_pose();
                    point.distance(&self.start_point()).min(point.distance(&Point2D::new(ex, ey)))
                }
            }
            SegmentKind::PointTurn { pivot, .. } => point.distance(&pivot),
        }
    }

    pub fn offset(&mut self, dx: f64, dy: f64) {
        let shift = |p: &mut Point2D| {
            p.x += dx;
            p.y += dy;
        };
        match &mut self.kind {
            SegmentKind::Line { start, end } => {
                shift(start);
                shift(end);
            }
            SegmentKind::Arc { center, .. } => shift(center),
            SegmentKind::PointTurn { pivot, .. } => shift(pivot),
        }
    }
}

fn kind_length(kind: &SegmentKind) -> f64 {
    match kind {
        SegmentKind::Line { start, end } => start.distance(end),
        SegmentKind::Arc { radius, sweep, .. } => sweep.abs() * radius,
        SegmentKind::PointTurn { .. } => 0.0,
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SegmentKind::Line { start, end } => write!(
                f,
                "line: ({:.2}, {:.2}) to ({:.2}, {:.2})",
                start.x, start.y, end.x, end.y
            )?,
            SegmentKind::Arc { center, radius, start_angle, sweep } => write!(
                f,
                "arc: center ({:.2}, {:.2}), radius {:.2}, start {:.3}, sweep {:.3}",
                center.x, center.y, radius, start_angle, sweep
            )?,
            SegmentKind::PointTurn { pivot, target_angle, angle_tolerance, .. } => write!(
                f,
                "point turn: ({:.2}, {:.2}), target {:.3}, tol {:.1}deg",
                pivot.x,
                pivot.y,
                target_angle,
                angle_tolerance.to_degrees()
            )?,
        }
        write!(
            f,
            ", speed/accel/decel = ({:.2}, {:.2}, {:.2}){}",
            self.target_speed,
            self.accel,
            self.decel,
            if self.is_docking { " [dock]" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths_per_kind() {
        let line = PathSegment::line(Point2D::new(0.0, 0.0), Point2D::new(3.0, 4.0), 10.0, 1.0, 1.0);
        assert!((line.length() - 5.0).abs() < 1e-12);

        let arc = PathSegment::arc(Point2D::new(0.0, 0.0), 10.0, 0.0, -FRAC_PI_2, 10.0, 1.0, 1.0);
        assert!((arc.length() - 5.0 * PI).abs() < 1e-9);

        let turn = PathSegment::point_turn(Point2D::new(1.0, 1.0), 0.0, 1.0, 2.0, 10.0, 10.0, 0.1);
        assert_eq!(turn.length(), 0.0);
    }

    #[test]
    fn reverse_line_faces_backwards() {
        let line = PathSegment::line(Point2D::new(0.0, 0.0), Point2D::new(-10.0, 0.0), -20.0, 1.0, 1.0);
        let (_, _, heading) = line.end_pose();
        assert!(heading.abs() < 1e-9);
        assert!(line.is_reverse());
    }

    #[test]
    fn arc_end_pose_is_tangent() {
        let arc = PathSegment::arc(Point2D::new(0.0, 0.0), 10.0, -FRAC_PI_2, FRAC_PI_2, 10.0, 1.0, 1.0);
        let (x, y, heading) = arc.end_pose();
        assert!((x - 10.0).abs() < 1e-9);
        assert!(y.abs() < 1e-9);
        assert!((heading - FRAC_PI_2).abs() < 1e-9);
        assert!(arc.start_heading().abs() < 1e-9);
    }

    #[test]
    fn split_line_and_arc() {
        let line = PathSegment::line(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0), 10.0, 1.0, 1.0);
        let (a, b) = line.split_at(4.0).unwrap();
        assert!((a.length() - 4.0).abs() < 1e-12);
        assert!((b.length() - 6.0).abs() < 1e-12);
        assert_eq!(b.start_point(), Point2D::new(4.0, 0.0));

        let arc = PathSegment::arc(Point2D::new(0.0, 0.0), 10.0, 0.0, PI, 10.0, 1.0, 1.0);
        let (a, b) = arc.split_at(arc.length() / 4.0).unwrap();
        assert!((a.length() + b.length() - arc.length()).abs() < 1e-9);
        match (a.kind(), b.kind()) {
            (SegmentKind::Arc { sweep: s1, .. }, SegmentKind::Arc { start_angle, sweep: s2, .. }) => {
                assert!((s1 - PI / 4.0).abs() < 1e-9);
                assert!((start_angle - PI / 4.0).abs() < 1e-9);
                assert!((s2 - 3.0 * PI / 4.0).abs() < 1e-9);
            }
            _ => panic!("expected arcs"),
        }

        assert!(line.split_at(0.0).is_none());
        assert!(line.split_at(10.0).is_none());
    }

    #[test]
    fn offset_moves_geometry_only() {
        let mut arc = PathSegment::arc(Point2D::new(0.0, 0.0), 10.0, 0.0, PI, 10.0, 1.0, 1.0);
        let before = arc.length();
        arc.offset(5.0, -2.0);
        assert_eq!(arc.start_point(), Point2D::new(15.0, -2.0));
        assert_eq!(arc.length(), before);
    }

    #[test]
    fn distance_to_line_clamps_to_endpoints() {
        let line = PathSegment::line(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0), 10.0, 1.0, 1.0);
        assert!((line.distance_to(&Point2D::new(5.0, 3.0)) - 3.0).abs() < 1e-12);
        assert!((line.distance_to(&Point2D::new(13.0, 4.0)) - 5.0).abs() < 1e-12);
    }
}
