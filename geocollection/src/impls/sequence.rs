//! Operations shared by geometries stored as a plain sequence of vertices.

use crate::point::Point;
use crate::segment::near;
use crate::wkb_type::Dimensions;

pub(crate) fn swap_xy(points: &mut [Point]) {
    points.iter_mut().for_each(Point::swap_xy);
}

pub(crate) fn set_dimensions(points: &mut [Point], dimensions: Dimensions) {
    for p in points {
        *p = p.with_dimensions(dimensions);
    }
}

pub(crate) fn fill_z(points: &mut [Point], z: f64) {
    points.iter_mut().for_each(|p| p.set_z(Some(z)));
}

pub(crate) fn fill_m(points: &mut [Point], m: f64) {
    points.iter_mut().for_each(|p| p.set_m(Some(m)));
}

pub(crate) fn transform(
    points: &mut [Point],
    dimensions: Dimensions,
    f: &mut dyn FnMut(&Point) -> Point,
) {
    for p in points {
        *p = f(p).with_dimensions(dimensions);
    }
}

/// Applies the transformation until it fails. Returns false on the first failure.
pub(crate) fn try_transform(
    points: &mut [Point],
    dimensions: Dimensions,
    f: &mut dyn FnMut(&Point) -> Option<Point>,
) -> bool {
    for p in points {
        match f(p) {
            Some(transformed) => *p = transformed.with_dimensions(dimensions),
            None => return false,
        }
    }

    true
}

/// Removes consecutive vertices whose ordinates each differ by no more than `tolerance` from the last kept
/// vertex. Sequences of two or less vertices are never changed.
pub(crate) fn remove_duplicates(points: &mut Vec<Point>, tolerance: f64, use_z: bool) -> bool {
    if points.len() <= 2 {
        return false;
    }

    let initial = points.len();
    let mut prev = points[0];
    let mut kept = Vec::with_capacity(initial);
    kept.push(prev);

    for p in &points[1..] {
        let same_z = match (use_z, p.z(), prev.z()) {
            (true, Some(z), Some(prev_z)) => near(z, prev_z, tolerance),
            _ => true,
        };
        if near(p.x(), prev.x(), tolerance) && near(p.y(), prev.y(), tolerance) && same_z {
            continue;
        }

        kept.push(*p);
        prev = *p;
    }

    *points = kept;
    points.len() != initial
}
