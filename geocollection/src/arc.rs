//! Circular arcs defined by three points.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use crate::config::{SegmentationTolerance, ToleranceKind};
use crate::point::Point;
use crate::segment::{self, line_angle, normalized_angle, Side};

/// Circular arc passing through start, control and end points.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Arc {
    center: Point,
    radius: f64,
    start_angle: f64,
    /// Signed sweep, positive for counter-clockwise arcs.
    sweep: f64,
    /// Unsigned angular offset of the control point from the start point.
    control_offset: f64,
}

impl Arc {
    /// Builds the arc. Returns `None` for collinear or coincident points.
    pub fn new(start: &Point, control: &Point, end: &Point) -> Option<Self> {
        if start.equal_2d(end) {
            if start.equal_2d(control) {
                return None;
            }

            let center = Point::new(
                (start.x() + control.x()) / 2.0,
                (start.y() + control.y()) / 2.0,
            );
            return Some(Self {
                center,
                radius: start.distance(control) / 2.0,
                start_angle: angle_from(&center, start),
                sweep: TAU,
                control_offset: TAU / 2.0,
            });
        }

        let (ax, ay) = (start.x(), start.y());
        let (bx, by) = (control.x(), control.y());
        let (cx, cy) = (end.x(), end.y());

        let cross = (bx - ax) * (cy - by) - (by - ay) * (cx - bx);
        let scale = start.distance(control) * control.distance(end);
        if scale == 0.0 || (cross / scale).abs() < 1e-12 {
            return None;
        }

        let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
        let a2 = ax * ax + ay * ay;
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let center = Point::new(
            (a2 * (by - cy) + b2 * (cy - ay) + c2 * (ay - by)) / d,
            (a2 * (cx - bx) + b2 * (ax - cx) + c2 * (bx - ax)) / d,
        );

        let start_angle = angle_from(&center, start);
        let control_angle = angle_from(&center, control);
        let end_angle = angle_from(&center, end);

        let (sweep, control_offset) = if cross > 0.0 {
            (
                normalized_angle(end_angle - start_angle),
                normalized_angle(control_angle - start_angle),
            )
        } else {
            (
                -normalized_angle(start_angle - end_angle),
                normalized_angle(start_angle - control_angle),
            )
        };

        Some(Self {
            center,
            radius: center.distance(start),
            start_angle,
            sweep,
            control_offset,
        })
    }

    pub fn is_counter_clockwise(&self) -> bool {
        self.sweep > 0.0
    }

    pub fn length(&self) -> f64 {
        self.radius * self.sweep.abs()
    }

    /// Signed area between the arc and its chord, positive for counter-clockwise arcs.
    pub fn segment_area(&self) -> f64 {
        let sweep = self.sweep.abs();
        let area = self.radius * self.radius / 2.0 * (sweep - sweep.sin());
        area.copysign(self.sweep)
    }

    fn point_at_offset(&self, offset: f64) -> Point {
        let angle = self.start_angle + offset.copysign(self.sweep);
        Point::new(
            self.center.x() + self.radius * angle.cos(),
            self.center.y() + self.radius * angle.sin(),
        )
    }

    /// Unsigned offset of the direction to `point` from the start, measured along the sweep direction.
    fn offset_of(&self, point: &Point) -> f64 {
        let angle = angle_from(&self.center, point);
        if self.is_counter_clockwise() {
            normalized_angle(angle - self.start_angle)
        } else {
            normalized_angle(self.start_angle - angle)
        }
    }

    fn step_count(&self, tolerance: SegmentationTolerance) -> usize {
        let increment = match tolerance.kind {
            ToleranceKind::MaximumAngle => tolerance.tolerance,
            ToleranceKind::MaximumDifference if tolerance.tolerance < self.radius => {
                2.0 * (1.0 - tolerance.tolerance / self.radius).acos()
            }
            ToleranceKind::MaximumDifference => FRAC_PI_4,
        };

        let increment = if increment.is_finite() && increment > 0.0 {
            increment
        } else {
            SegmentationTolerance::default().tolerance
        };

        ((self.sweep.abs() / increment).ceil() as usize).max(1)
    }

    /// Direction of travel at `point` on the arc, clockwise from north.
    pub fn tangent_at(&self, point: &Point) -> f64 {
        let radial = line_angle(&self.center, point);
        if self.is_counter_clockwise() {
            normalized_angle(radial - FRAC_PI_2)
        } else {
            normalized_angle(radial + FRAC_PI_2)
        }
    }

    /// Side of the arc the point lies on.
    pub fn side_of(&self, point: &Point) -> Option<Side> {
        let dist = self.center.distance(point);
        if segment::near(dist, self.radius, 1e-12 * self.radius.max(1.0)) {
            return None;
        }

        let inside = dist < self.radius;
        match (inside, self.is_counter_clockwise()) {
            (true, true) | (false, false) => Some(Side::Left),
            _ => Some(Side::Right),
        }
    }
}

fn angle_from(center: &Point, point: &Point) -> f64 {
    (point.y() - center.y()).atan2(point.x() - center.x())
}

/// Replaces the arc by a chain of vertices. The start point is included, the end point is not.
///
/// Z and M are interpolated linearly along the arc, separately before and after the control point.
pub(crate) fn segmentize(
    start: &Point,
    control: &Point,
    end: &Point,
    tolerance: SegmentationTolerance,
) -> Vec<Point> {
    let Some(arc) = Arc::new(start, control, end) else {
        if start.equal_2d(control) || control.equal_2d(end) {
            return vec![*start];
        }
        return vec![*start, *control];
    };

    let steps = arc.step_count(tolerance);
    let sweep = arc.sweep.abs();
    let increment = sweep / steps as f64;

    let mut result = Vec::with_capacity(steps);
    result.push(*start);
    for step in 1..steps {
        let offset = increment * step as f64;
        let along = if offset <= arc.control_offset {
            start.lerp(control, offset / arc.control_offset)
        } else {
            control.lerp(end, (offset - arc.control_offset) / (sweep - arc.control_offset))
        };

        let mut point = arc.point_at_offset(offset);
        point.set_z(along.z());
        point.set_m(along.m());
        result.push(point);
    }

    result
}

/// Closest point of the arc to `query`.
///
/// Returns the squared distance, the closest point and whether that point lies after the control point.
pub(crate) fn closest_point(
    start: &Point,
    control: &Point,
    end: &Point,
    query: &Point,
) -> Option<(f64, Point, bool, Option<Side>)> {
    let arc = Arc::new(start, control, end)?;

    let offset = arc.offset_of(query);
    let on_arc = !query.equal_2d(&arc.center) && offset <= arc.sweep.abs();
    let (closest, after_control) = if on_arc {
        (arc.point_at_offset(offset), offset > arc.control_offset)
    } else if query.distance_sq(start) <= query.distance_sq(end) {
        (Point::new(start.x(), start.y()), false)
    } else {
        (Point::new(end.x(), end.y()), true)
    };

    Some((
        closest.distance_sq(query),
        closest,
        after_control,
        arc.side_of(query),
    ))
}
