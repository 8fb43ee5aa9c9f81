//! Distance and direction computations on straight segments.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::point::Point;
use crate::vertex_id::VertexId;

/// Default tolerance used to compare floating point distances.
pub const DEFAULT_EPSILON: f64 = 4.0 * f64::EPSILON;

/// Side of a directed segment on which a point lies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// To the left looking along the segment.
    Left,
    /// To the right looking along the segment.
    Right,
}

impl Side {
    /// The other side.
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Result of a closest segment search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Squared distance from the query point to the segment.
    pub sq_dist: f64,
    /// Closest point on the segment (X and Y only).
    pub point: Point,
    /// Id of the end vertex of the closest segment.
    pub vertex_after: VertexId,
    /// Side of the segment the query point lies on, `None` if it lies on the segment line or the side
    /// cannot be determined.
    pub left_of: Option<Side>,
}

impl SegmentHit {
    /// Replaces `best` with `candidate` if the candidate is strictly closer.
    pub(crate) fn keep_closest(best: &mut Option<SegmentHit>, candidate: Option<SegmentHit>) {
        if let Some(candidate) = candidate {
            if best.map_or(true, |b| candidate.sq_dist < b.sq_dist) {
                *best = Some(candidate);
            }
        }
    }
}

pub(crate) fn near(a: f64, b: f64, epsilon: f64) -> bool {
    let diff = a - b;
    diff > -epsilon && diff <= epsilon
}

/// Squared distance from `point` to the segment `a`-`b` and the closest point on the segment.
///
/// If the distance is within `epsilon` of zero, the query point itself is returned as the closest one and the
/// distance is exactly `0`.
pub fn sq_dist_to_segment(point: &Point, a: &Point, b: &Point, epsilon: f64) -> (f64, Point) {
    let mut closest_x = a.x();
    let mut closest_y = a.y();
    let dx = b.x() - a.x();
    let dy = b.y() - a.y();

    if !near(dx, 0.0, DEFAULT_EPSILON) || !near(dy, 0.0, DEFAULT_EPSILON) {
        let t = ((point.x() - a.x()) * dx + (point.y() - a.y()) * dy) / (dx * dx + dy * dy);
        if t > 1.0 {
            closest_x = b.x();
            closest_y = b.y();
        } else if t > 0.0 {
            closest_x += dx * t;
            closest_y += dy * t;
        }
    }

    let dist = Point::new(closest_x, closest_y).distance_sq(point);
    if near(dist, 0.0, epsilon) {
        return (0.0, Point::new(point.x(), point.y()));
    }

    (dist, Point::new(closest_x, closest_y))
}

/// Side of the directed line `a`-`b` on which `point` lies.
pub fn left_of_line(point: &Point, a: &Point, b: &Point) -> Option<Side> {
    let test = (point.x() - a.x()) * (b.y() - a.y()) - (point.y() - a.y()) * (b.x() - a.x());
    if near(test, 0.0, DEFAULT_EPSILON) {
        None
    } else if test < 0.0 {
        Some(Side::Left)
    } else {
        Some(Side::Right)
    }
}

/// Closest straight segment of a polyline. The returned vertex id has part and ring `0`.
///
/// When two segments are equally close and disagree on the side of the query point (the point is near a
/// vertex), the side is decided by the turn direction at that vertex.
pub(crate) fn closest_polyline_segment(
    points: &[Point],
    query: &Point,
    epsilon: f64,
) -> Option<SegmentHit> {
    if points.len() < 2 {
        return None;
    }

    let mut sq_dist = f64::MAX;
    let mut closest = Point::new(0.0, 0.0);
    let mut vertex = 0;
    let mut left_of = None;
    let mut left_of_dist = f64::MAX;
    let mut prev_left_of: Option<Side> = None;
    let mut prev_left_of_start = Point::new(0.0, 0.0);

    for (i, pair) in points.windows(2).enumerate() {
        let (a, b) = (&pair[0], &pair[1]);
        let (test_dist, segment_point) = sq_dist_to_segment(query, a, b, epsilon);
        if test_dist < sq_dist {
            sq_dist = test_dist;
            closest = segment_point;
            vertex = i + 1;
        }

        if !near(test_dist, sq_dist, DEFAULT_EPSILON) {
            continue;
        }

        match left_of_line(query, a, b) {
            Some(side) => {
                left_of = match prev_left_of {
                    Some(prev)
                        if prev != side && near(test_dist, left_of_dist, DEFAULT_EPSILON) =>
                    {
                        left_of_line(b, &prev_left_of_start, a).map(Side::opposite)
                    }
                    _ => Some(side),
                };
                prev_left_of = left_of;
                left_of_dist = test_dist;
                prev_left_of_start = *a;
            }
            None if test_dist < left_of_dist => {
                left_of = None;
                left_of_dist = test_dist;
                prev_left_of = None;
            }
            None => {}
        }
    }

    Some(SegmentHit {
        sq_dist,
        point: closest,
        vertex_after: VertexId::new(0, 0, vertex),
        left_of,
    })
}

/// Angle normalized into `[0, 2π)`.
pub fn normalized_angle(angle: f64) -> f64 {
    let clipped = angle % TAU;
    if clipped < 0.0 {
        clipped + TAU
    } else {
        clipped
    }
}

/// Direction of the line from `a` to `b` in radians, clockwise from north.
pub fn line_angle(a: &Point, b: &Point) -> f64 {
    normalized_angle(FRAC_PI_2 - (b.y() - a.y()).atan2(b.x() - a.x()))
}

/// Bisector of two directions, taken on the side of the smaller difference.
pub fn average_angle(a1: f64, a2: f64) -> f64 {
    let a1 = normalized_angle(a1);
    let a2 = normalized_angle(a2);
    let clockwise_diff = if a2 >= a1 { a2 - a1 } else { a2 + (TAU - a1) };
    let counter_clockwise_diff = TAU - clockwise_diff;

    if clockwise_diff <= counter_clockwise_diff {
        normalized_angle(a1 + clockwise_diff / 2.0)
    } else {
        normalized_angle(a1 - counter_clockwise_diff / 2.0)
    }
}

/// Angle at a vertex of a polyline. Closed polylines wrap around at their endpoints.
pub(crate) fn polyline_vertex_angle(points: &[Point], vertex: usize) -> Option<f64> {
    let n = points.len();
    if vertex >= n {
        return None;
    }
    if n == 1 {
        return Some(0.0);
    }

    let angle = if vertex == 0 || vertex == n - 1 {
        if n > 2 && is_closed(points) {
            average_angle(
                line_angle(&points[n - 2], &points[0]),
                line_angle(&points[0], &points[1]),
            )
        } else if vertex == 0 {
            line_angle(&points[0], &points[1])
        } else {
            line_angle(&points[n - 2], &points[n - 1])
        }
    } else {
        average_angle(
            line_angle(&points[vertex - 1], &points[vertex]),
            line_angle(&points[vertex], &points[vertex + 1]),
        )
    };

    Some(angle)
}

/// True if the first and the last point of the sequence coincide in 2D.
pub(crate) fn is_closed(points: &[Point]) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 => {
            near(first.x(), last.x(), DEFAULT_EPSILON) && near(first.y(), last.y(), DEFAULT_EPSILON)
        }
        _ => false,
    }
}

/// Signed shoelace area of a closed sequence, positive for counter-clockwise rings.
pub(crate) fn shoelace(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let sum: f64 = points
        .windows(2)
        .map(|pair| pair[0].x() * pair[1].y() - pair[1].x() * pair[0].y())
        .sum();
    let (first, last) = (&points[0], &points[points.len() - 1]);
    (sum + last.x() * first.y() - first.x() * last.y()) / 2.0
}

/// Sum of the segment lengths.
pub(crate) fn polyline_length(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[0].distance(&pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn triangle() -> Vec<Point> {
        vec![
            Point::new(5.0, 10.0),
            Point::new(7.0, 12.0),
            Point::new(5.0, 15.0),
            Point::new(5.0, 10.0),
        ]
    }

    #[test]
    fn distance_to_segment() {
        let (dist, closest) = sq_dist_to_segment(
            &Point::new(1.0, 1.0),
            &Point::new(0.0, 0.0),
            &Point::new(2.0, 0.0),
            DEFAULT_EPSILON,
        );
        assert_eq!(dist, 1.0);
        assert_eq!(closest, Point::new(1.0, 0.0));

        let (dist, closest) = sq_dist_to_segment(
            &Point::new(3.0, 1.0),
            &Point::new(0.0, 0.0),
            &Point::new(2.0, 0.0),
            DEFAULT_EPSILON,
        );
        assert_eq!(dist, 2.0);
        assert_eq!(closest, Point::new(2.0, 0.0));
    }

    #[test]
    fn closest_polyline_segment_sides() {
        let points = triangle();
        let closest = |x: f64, y: f64| {
            closest_polyline_segment(&points, &Point::new(x, y), DEFAULT_EPSILON).unwrap()
        };

        let hit = closest(4.0, 11.0);
        assert_abs_diff_eq!(hit.sq_dist, 1.0);
        assert_eq!(hit.point, Point::new(5.0, 11.0));
        assert_eq!(hit.vertex_after, VertexId::new(0, 0, 3));
        assert_eq!(hit.left_of, Some(Side::Right));

        let hit = closest(8.0, 11.0);
        assert_abs_diff_eq!(hit.sq_dist, 2.0);
        assert_eq!(hit.point, Point::new(7.0, 12.0));
        assert_eq!(hit.vertex_after, VertexId::new(0, 0, 1));
        assert_eq!(hit.left_of, Some(Side::Right));

        let hit = closest(6.0, 11.5);
        assert_abs_diff_eq!(hit.sq_dist, 0.125, epsilon = 1e-6);
        assert_abs_diff_eq!(hit.point, Point::new(6.25, 11.25), epsilon = 1e-6);
        assert_eq!(hit.vertex_after, VertexId::new(0, 0, 1));
        assert_eq!(hit.left_of, Some(Side::Left));

        let hit = closest(7.0, 16.0);
        assert_abs_diff_eq!(hit.sq_dist, 4.923077, epsilon = 1e-5);
        assert_abs_diff_eq!(hit.point, Point::new(5.153846, 14.769231), epsilon = 1e-5);
        assert_eq!(hit.vertex_after, VertexId::new(0, 0, 2));
        assert_eq!(hit.left_of, Some(Side::Right));

        let hit = closest(5.5, 13.5);
        assert_abs_diff_eq!(hit.sq_dist, 0.173077, epsilon = 1e-5);
        assert_eq!(hit.vertex_after, VertexId::new(0, 0, 2));
        assert_eq!(hit.left_of, Some(Side::Left));
    }

    #[test]
    fn closest_polyline_segment_on_vertex() {
        let hit =
            closest_polyline_segment(&triangle(), &Point::new(7.0, 12.0), DEFAULT_EPSILON).unwrap();
        assert_eq!(hit.sq_dist, 0.0);
        assert_eq!(hit.point, Point::new(7.0, 12.0));
        assert_eq!(hit.vertex_after, VertexId::new(0, 0, 1));
        assert_eq!(hit.left_of, None);
    }

    #[test]
    fn degenerate_polyline() {
        assert!(closest_polyline_segment(&[], &Point::new(0.0, 0.0), DEFAULT_EPSILON).is_none());
        assert!(closest_polyline_segment(
            &[Point::new(1.0, 1.0)],
            &Point::new(0.0, 0.0),
            DEFAULT_EPSILON
        )
        .is_none());
    }

    #[test]
    fn angles() {
        assert_abs_diff_eq!(
            line_angle(&Point::new(0.0, 0.0), &Point::new(0.0, 1.0)),
            0.0
        );
        assert_abs_diff_eq!(
            line_angle(&Point::new(0.0, 0.0), &Point::new(1.0, 0.0)),
            FRAC_PI_2
        );
        assert_abs_diff_eq!(average_angle(0.1, TAU - 0.1), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalized_angle(-FRAC_PI_2), 3.0 * FRAC_PI_2);
    }

    #[test]
    fn polyline_angles() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(0.5, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 1.0),
            Point::new(1.0, 2.0),
            Point::new(0.0, 2.0),
            Point::new(0.0, 0.0),
        ];
        let expected = [2.35619, 1.5708, 1.17809, 0.0, 5.10509, 3.92699, 2.35619];
        for (i, angle) in expected.iter().enumerate() {
            let diff = (polyline_vertex_angle(&points, i).unwrap() - angle).abs();
            assert!(diff.min(TAU - diff) < 1e-4, "vertex {i}");
        }
        assert_eq!(polyline_vertex_angle(&points, 7), None);
    }

    #[test]
    fn ring_area() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
            Point::new(0.0, 0.0),
        ];
        assert_abs_diff_eq!(shoelace(&square), 4.0);
        assert_abs_diff_eq!(polyline_length(&square), 8.0);
        assert!(is_closed(&square));
    }
}
