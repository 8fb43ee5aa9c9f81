//! Conversions between the geometries of this crate and [`geo_types`].
//!
//! `geo_types` has neither curves nor Z and M ordinates. Curves are segmentized with the default tolerance,
//! Z and M values are dropped. Empty points have no `geo_types` counterpart and are skipped.

use geo_types::Coord;

use crate::collection::GeometryCollection;
use crate::config::SegmentationTolerance;
use crate::error::GeometryError;
use crate::geometry::{Geom, Geometry};
use crate::impls::{LineString, Polygon};
use crate::point::Point;
use crate::wkb_type::{GeometryKind, WkbType};

impl From<&GeometryCollection> for geo_types::GeometryCollection<f64> {
    fn from(value: &GeometryCollection) -> Self {
        geo_types::GeometryCollection(
            value
                .segmentized(SegmentationTolerance::default())
                .parts()
                .iter()
                .filter_map(to_geo)
                .collect(),
        )
    }
}

impl TryFrom<&Geom> for geo_types::Geometry<f64> {
    type Error = GeometryError;

    fn try_from(value: &Geom) -> Result<Self, Self::Error> {
        to_geo(&value.segmentize(SegmentationTolerance::default()))
            .ok_or_else(|| GeometryError::Conversion("empty point".to_string()))
    }
}

/// Expects segmentized input.
fn to_geo(geometry: &Geom) -> Option<geo_types::Geometry<f64>> {
    let converted = match geometry {
        Geom::Point(point) => geo_types::Geometry::Point(geo_types::Point(coord(point)?)),
        Geom::LineString(line) => geo_types::Geometry::LineString(geo_line(line)),
        Geom::Polygon(polygon) => geo_types::Geometry::Polygon(geo_polygon(polygon)),
        Geom::GeometryCollection(collection) => geo_collection(collection),
        _ => return None,
    };

    Some(converted)
}

fn geo_collection(collection: &GeometryCollection) -> geo_types::Geometry<f64> {
    let parts = collection.parts();
    match collection.wkb_type().kind {
        GeometryKind::MultiPoint => geo_types::Geometry::MultiPoint(geo_types::MultiPoint(
            parts
                .iter()
                .filter_map(|part| match part {
                    Geom::Point(point) => coord(point).map(geo_types::Point),
                    _ => None,
                })
                .collect(),
        )),
        GeometryKind::MultiLineString | GeometryKind::MultiCurve => {
            geo_types::Geometry::MultiLineString(geo_types::MultiLineString(
                parts
                    .iter()
                    .filter_map(|part| match part {
                        Geom::LineString(line) => Some(geo_line(line)),
                        _ => None,
                    })
                    .collect(),
            ))
        }
        GeometryKind::MultiPolygon | GeometryKind::MultiSurface => {
            geo_types::Geometry::MultiPolygon(geo_types::MultiPolygon(
                parts
                    .iter()
                    .filter_map(|part| match part {
                        Geom::Polygon(polygon) => Some(geo_polygon(polygon)),
                        _ => None,
                    })
                    .collect(),
            ))
        }
        _ => geo_types::Geometry::GeometryCollection(geo_types::GeometryCollection(
            parts.iter().filter_map(to_geo).collect(),
        )),
    }
}

fn coord(point: &Point) -> Option<Coord<f64>> {
    (!point.is_empty()).then(|| Coord {
        x: point.x(),
        y: point.y(),
    })
}

fn geo_line(line: &LineString) -> geo_types::LineString<f64> {
    geo_types::LineString(line.points().iter().filter_map(coord).collect())
}

fn geo_polygon(polygon: &Polygon) -> geo_types::Polygon<f64> {
    geo_types::Polygon::new(
        polygon
            .exterior()
            .map(geo_line)
            .unwrap_or_else(|| geo_types::LineString(vec![])),
        polygon.interiors().iter().map(geo_line).collect(),
    )
}

impl From<geo_types::Geometry<f64>> for Geom {
    fn from(value: geo_types::Geometry<f64>) -> Self {
        match value {
            geo_types::Geometry::Point(point) => Geom::Point(from_coord(point.0)),
            geo_types::Geometry::Line(line) => Geom::LineString(LineString::new(vec![
                from_coord(line.start),
                from_coord(line.end),
            ])),
            geo_types::Geometry::LineString(line) => Geom::LineString(from_geo_line(line)),
            geo_types::Geometry::Polygon(polygon) => Geom::Polygon(from_geo_polygon(polygon)),
            geo_types::Geometry::Rect(rect) => Geom::Polygon(from_geo_polygon(rect.to_polygon())),
            geo_types::Geometry::Triangle(triangle) => {
                Geom::Polygon(from_geo_polygon(triangle.to_polygon()))
            }
            geo_types::Geometry::MultiPoint(points) => collection(
                GeometryKind::MultiPoint,
                points.0.into_iter().map(|point| Geom::Point(from_coord(point.0))),
            ),
            geo_types::Geometry::MultiLineString(lines) => collection(
                GeometryKind::MultiLineString,
                lines.0.into_iter().map(|line| Geom::LineString(from_geo_line(line))),
            ),
            geo_types::Geometry::MultiPolygon(polygons) => collection(
                GeometryKind::MultiPolygon,
                polygons
                    .0
                    .into_iter()
                    .map(|polygon| Geom::Polygon(from_geo_polygon(polygon))),
            ),
            geo_types::Geometry::GeometryCollection(geometries) => {
                Geom::GeometryCollection(geometries.into())
            }
        }
    }
}

impl From<geo_types::GeometryCollection<f64>> for GeometryCollection {
    fn from(value: geo_types::GeometryCollection<f64>) -> Self {
        let mut collection = GeometryCollection::new();
        for geometry in value.0 {
            collection.add_geometry(Geom::from(geometry));
        }

        collection
    }
}

/// Accepts multi-geometries and geometry collections.
impl TryFrom<geo_types::Geometry<f64>> for GeometryCollection {
    type Error = GeometryError;

    fn try_from(value: geo_types::Geometry<f64>) -> Result<Self, Self::Error> {
        match Geom::from(value) {
            Geom::GeometryCollection(collection) => Ok(collection),
            other => Err(GeometryError::UnexpectedType {
                expected: WkbType::flat(GeometryKind::GeometryCollection),
                found: other.wkb_type(),
            }),
        }
    }
}

fn collection(kind: GeometryKind, parts: impl Iterator<Item = Geom>) -> Geom {
    let mut collection = GeometryCollection::with_type(WkbType::flat(kind)).unwrap_or_default();
    for part in parts {
        collection.add_geometry(part);
    }

    Geom::GeometryCollection(collection)
}

fn from_coord(coord: Coord<f64>) -> Point {
    Point::new(coord.x, coord.y)
}

fn from_geo_line(line: geo_types::LineString<f64>) -> LineString {
    LineString::new(line.0.into_iter().map(from_coord).collect())
}

fn from_geo_polygon(polygon: geo_types::Polygon<f64>) -> Polygon {
    let (exterior, interiors) = polygon.into_inner();
    if exterior.0.is_empty() {
        return Polygon::default();
    }

    Polygon::new(
        from_geo_line(exterior),
        interiors.into_iter().map(from_geo_line).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::tests::{line, square_collection};
    use crate::impls::CircularString;
    use crate::wkb_type::Dimensions;
    use assert_matches::assert_matches;
    use geo_types::{coord, line_string, point, polygon};

    #[test]
    fn to_geo_types() {
        let mut collection = square_collection();
        collection.add_geometry(Point::new_z(1.0, 2.0, 3.0));
        collection.add_geometry(Point::empty(Dimensions::Xy));

        let converted = geo_types::GeometryCollection::from(&collection);
        assert_eq!(converted.0.len(), 2);
        assert_eq!(
            converted.0[0],
            geo_types::Geometry::LineString(line_string![
                (x: 0.0, y: 0.0),
                (x: 0.0, y: 10.0),
                (x: 10.0, y: 10.0),
                (x: 10.0, y: 0.0),
                (x: 0.0, y: 0.0),
            ])
        );
        assert_eq!(converted.0[1], geo_types::Geometry::Point(point!(x: 1.0, y: 2.0)));
    }

    #[test]
    fn multi_geometries_and_curves() {
        let mut multi =
            GeometryCollection::with_type(WkbType::flat(GeometryKind::MultiSurface)).unwrap();
        multi.add_geometry(Polygon::new(line(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]), vec![]));

        let mut collection = GeometryCollection::new();
        collection.add_geometry(multi);
        collection.add_geometry(CircularString::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
        ]));

        let converted = geo_types::GeometryCollection::from(&collection);
        assert_matches!(
            &converted.0[0],
            geo_types::Geometry::MultiPolygon(polygons) if polygons.0.len() == 1
        );
        assert_matches!(
            &converted.0[1],
            geo_types::Geometry::LineString(line)
                if line.0.len() > 3 && line.0[0] == coord! { x: 0.0, y: 0.0 }
        );
    }

    #[test]
    fn from_geo_types() {
        let geo = geo_types::GeometryCollection(vec![
            geo_types::Geometry::Point(point!(x: 1.0, y: 2.0)),
            geo_types::Geometry::Polygon(polygon![
                (x: 0.0, y: 0.0),
                (x: 0.0, y: 4.0),
                (x: 4.0, y: 4.0),
            ]),
            geo_types::Geometry::MultiPoint(vec![point!(x: 5.0, y: 6.0)].into()),
        ]);

        let collection = GeometryCollection::from(geo.clone());
        assert_eq!(collection.num_geometries(), 3);
        assert_eq!(collection.parts()[0], Geom::Point(Point::new(1.0, 2.0)));
        assert_eq!(collection.part_ring_count(1), 1);
        assert_eq!(collection.parts()[1].vertex_count(0), 4);
        assert_eq!(collection.parts()[2].kind(), GeometryKind::MultiPoint);

        assert_eq!(geo_types::GeometryCollection::from(&collection), geo);
    }

    #[test]
    fn collection_from_single_geometry() {
        assert_matches!(
            GeometryCollection::try_from(geo_types::Geometry::Point(point!(x: 1.0, y: 2.0))),
            Err(GeometryError::UnexpectedType { .. })
        );

        let multi = GeometryCollection::try_from(geo_types::Geometry::MultiLineString(
            geo_types::MultiLineString(vec![line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]]),
        ))
        .unwrap();
        assert_eq!(multi.wkb_type(), WkbType::flat(GeometryKind::MultiLineString));
        assert_eq!(multi.num_geometries(), 1);
    }
}
