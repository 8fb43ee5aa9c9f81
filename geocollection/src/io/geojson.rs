use geojson::{PointType, Value};

use crate::collection::GeometryCollection;
use crate::config::ExportOptions;
use crate::error::GeometryError;
use crate::geometry::{Geom, Geometry};
use crate::impls::{LineString, Polygon};
use crate::point::Point;
use crate::wkb_type::{Dimensions, GeometryKind, WkbType};

impl GeometryCollection {
    /// Writes the collection as a GeoJSON `GeometryCollection` without rounding.
    pub fn to_json(&self) -> Result<String, GeometryError> {
        self.to_json_with(&ExportOptions::default())
    }

    /// Writes the collection as GeoJSON. Coordinates are rounded to the precision from the options, curves
    /// are segmentized. Multi-geometries are written as the corresponding GeoJSON multi types.
    pub fn to_json_with(&self, options: &ExportOptions) -> Result<String, GeometryError> {
        Ok(serde_json::to_string(&self.to_geojson(options))?)
    }

    /// Converts the collection into a `geojson` geometry.
    pub fn to_geojson(&self, options: &ExportOptions) -> geojson::Geometry {
        geojson::Geometry::new(collection_value(&self.segmentized(options.segmentation), options))
    }
}

impl Geom {
    /// Writes the geometry as GeoJSON.
    pub fn to_json_with(&self, options: &ExportOptions) -> Result<String, GeometryError> {
        let value = value(&self.segmentize(options.segmentation), options);
        Ok(serde_json::to_string(&geojson::Geometry::new(value))?)
    }
}

fn value(geometry: &Geom, options: &ExportOptions) -> Value {
    match geometry {
        Geom::Point(point) => Value::Point(position(point, options)),
        Geom::LineString(line) => Value::LineString(positions(line.points(), options)),
        Geom::Polygon(polygon) => Value::Polygon(polygon_positions(polygon, options)),
        Geom::GeometryCollection(collection) => collection_value(collection, options),
        curved => value(&curved.segmentize(options.segmentation), options),
    }
}

fn collection_value(collection: &GeometryCollection, options: &ExportOptions) -> Value {
    let parts = collection.parts();
    match collection.wkb_type().kind {
        GeometryKind::MultiPoint => Value::MultiPoint(
            parts
                .iter()
                .filter_map(|part| match part {
                    Geom::Point(point) => Some(position(point, options)),
                    _ => None,
                })
                .collect(),
        ),
        GeometryKind::MultiLineString | GeometryKind::MultiCurve => Value::MultiLineString(
            parts
                .iter()
                .filter_map(|part| match part {
                    Geom::LineString(line) => Some(positions(line.points(), options)),
                    _ => None,
                })
                .collect(),
        ),
        GeometryKind::MultiPolygon | GeometryKind::MultiSurface => Value::MultiPolygon(
            parts
                .iter()
                .filter_map(|part| match part {
                    Geom::Polygon(polygon) => Some(polygon_positions(polygon, options)),
                    _ => None,
                })
                .collect(),
        ),
        _ => Value::GeometryCollection(
            parts
                .iter()
                .map(|part| geojson::Geometry::new(value(part, options)))
                .collect(),
        ),
    }
}

fn round(value: f64, precision: Option<usize>) -> f64 {
    match precision {
        Some(digits) => {
            let factor = 10f64.powi(digits as i32);
            (value * factor).round() / factor
        }
        None => value,
    }
}

/// M is not representable in GeoJSON and is dropped.
fn position(point: &Point, options: &ExportOptions) -> PointType {
    if point.is_empty() {
        return vec![];
    }

    let mut position = vec![
        round(point.x(), options.precision),
        round(point.y(), options.precision),
    ];
    if let Some(z) = point.z() {
        position.push(round(z, options.precision));
    }

    position
}

fn positions(points: &[Point], options: &ExportOptions) -> Vec<PointType> {
    points.iter().map(|point| position(point, options)).collect()
}

fn polygon_positions(polygon: &Polygon, options: &ExportOptions) -> Vec<Vec<PointType>> {
    polygon
        .rings()
        .iter()
        .map(|ring| positions(ring.points(), options))
        .collect()
}

impl TryFrom<geojson::Geometry> for Geom {
    type Error = GeometryError;

    fn try_from(value: geojson::Geometry) -> Result<Self, Self::Error> {
        match value.value {
            Value::Point(position) => Ok(Geom::Point(convert_position(&position)?)),
            Value::LineString(line) => Ok(Geom::LineString(convert_line(&line)?)),
            Value::Polygon(polygon) => Ok(Geom::Polygon(convert_polygon(&polygon)?)),
            multi => GeometryCollection::try_from(geojson::Geometry::new(multi)).map(Geom::from),
        }
    }
}

/// Converts GeoJSON multi-geometries and geometry collections.
impl TryFrom<geojson::Geometry> for GeometryCollection {
    type Error = GeometryError;

    fn try_from(value: geojson::Geometry) -> Result<Self, Self::Error> {
        let (kind, parts) = match value.value {
            Value::MultiPoint(points) => (
                GeometryKind::MultiPoint,
                points
                    .iter()
                    .map(|position| convert_position(position).map(Geom::Point))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::MultiLineString(lines) => (
                GeometryKind::MultiLineString,
                lines
                    .iter()
                    .map(|line| convert_line(line).map(Geom::LineString))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::MultiPolygon(polygons) => (
                GeometryKind::MultiPolygon,
                polygons
                    .iter()
                    .map(|polygon| convert_polygon(polygon).map(Geom::Polygon))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::GeometryCollection(geometries) => (
                GeometryKind::GeometryCollection,
                geometries
                    .into_iter()
                    .map(Geom::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            _ => {
                return Err(GeometryError::Conversion(
                    "expected a multi-geometry or a geometry collection".to_string(),
                ))
            }
        };

        let dimensions = parts.first().map(Geom::dimensions).unwrap_or_default();
        GeometryCollection::from_parts(WkbType::new(kind, dimensions), parts)
            .ok_or_else(|| GeometryError::Conversion(format!("{kind:?} is not a collection")))
    }
}

fn convert_position(position: &[f64]) -> Result<Point, GeometryError> {
    match *position {
        [] => Ok(Point::empty(Dimensions::Xy)),
        [x, y] => Ok(Point::new(x, y)),
        [x, y, z, ..] => Ok(Point::new_z(x, y, z)),
        _ => Err(GeometryError::Conversion(
            "point must contain at least 2 dimensions".to_string(),
        )),
    }
}

fn convert_line(line: &[PointType]) -> Result<LineString, GeometryError> {
    Ok(LineString::new(
        line.iter()
            .map(|position| convert_position(position))
            .collect::<Result<Vec<_>, _>>()?,
    ))
}

fn convert_polygon(polygon: &[Vec<PointType>]) -> Result<Polygon, GeometryError> {
    let mut rings = polygon.iter().map(|ring| convert_line(ring));
    let Some(exterior) = rings.next().transpose()? else {
        return Ok(Polygon::default());
    };

    Ok(Polygon::new(exterior, rings.collect::<Result<Vec<_>, _>>()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::tests::line;
    use crate::impls::CircularString;
    use assert_matches::assert_matches;

    #[test]
    fn write_rings() {
        let mut collection = GeometryCollection::new();
        collection.add_geometry(line(&[
            (0.0, 0.0),
            (0.0, 10.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.0, 0.0),
        ]));
        collection.add_geometry(line(&[
            (1.0, 1.0),
            (1.0, 9.0),
            (9.0, 9.0),
            (9.0, 1.0),
            (1.0, 1.0),
        ]));
        assert_eq!(
            collection.to_json().unwrap(),
            concat!(
                r#"{"geometries":["#,
                r#"{"coordinates":[[0.0,0.0],[0.0,10.0],[10.0,10.0],[10.0,0.0],[0.0,0.0]],"type":"LineString"},"#,
                r#"{"coordinates":[[1.0,1.0],[1.0,9.0],[9.0,9.0],[9.0,1.0],[1.0,1.0]],"type":"LineString"}"#,
                r#"],"type":"GeometryCollection"}"#
            )
        );
    }

    #[test]
    fn write_with_precision() {
        let a = 10.0 / 9.0;
        let b = 100.0 / 9.0;
        let c = 2.0 / 3.0;
        let d = 4.0 / 3.0;
        let mut collection = GeometryCollection::new();
        collection.add_geometry(line(&[(a, a), (a, b), (b, b), (b, a), (a, a)]));
        collection.add_geometry(line(&[(c, c), (c, d), (d, d), (d, c), (c, c)]));
        assert_eq!(
            collection.to_json_with(&ExportOptions::with_precision(3)).unwrap(),
            concat!(
                r#"{"geometries":["#,
                r#"{"coordinates":[[1.111,1.111],[1.111,11.111],[11.111,11.111],[11.111,1.111],[1.111,1.111]],"type":"LineString"},"#,
                r#"{"coordinates":[[0.667,0.667],[0.667,1.333],[1.333,1.333],[1.333,0.667],[0.667,0.667]],"type":"LineString"}"#,
                r#"],"type":"GeometryCollection"}"#
            )
        );
    }

    #[test]
    fn write_multi_geometries() {
        let mut multi_point =
            GeometryCollection::with_type(WkbType::new(GeometryKind::MultiPoint, Dimensions::Xyzm))
                .unwrap();
        multi_point.add_geometry(Point::new_zm(1.0, 2.0, 3.0, 4.0));
        assert_eq!(
            multi_point.to_json().unwrap(),
            r#"{"coordinates":[[1.0,2.0,3.0]],"type":"MultiPoint"}"#
        );

        assert_eq!(
            GeometryCollection::new().to_json().unwrap(),
            r#"{"geometries":[],"type":"GeometryCollection"}"#
        );
    }

    #[test]
    fn curves_are_segmentized() {
        let mut collection =
            GeometryCollection::with_type(WkbType::flat(GeometryKind::MultiCurve)).unwrap();
        collection.add_geometry(CircularString::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
        ]));

        let json: serde_json::Value =
            serde_json::from_str(&collection.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "MultiLineString");
        let line = json["coordinates"][0].as_array().unwrap();
        assert!(line.len() > 3);
        assert_eq!(line[0], serde_json::json!([0.0, 0.0]));
        assert_eq!(line[line.len() - 1], serde_json::json!([2.0, 0.0]));
    }

    #[test]
    fn convert_from_geojson() {
        let geometry: geojson::Geometry = serde_json::from_str(
            r#"{"type":"GeometryCollection","geometries":[
                {"type":"Point","coordinates":[1.0,2.0,3.0]},
                {"type":"Polygon","coordinates":[[[0,0],[0,1],[1,1],[0,0]]]},
                {"type":"MultiLineString","coordinates":[[[0,0],[1,1]]]}
            ]}"#,
        )
        .unwrap();

        let collection = GeometryCollection::try_from(geometry).unwrap();
        assert_eq!(collection.num_geometries(), 3);
        assert_eq!(collection.dimensions(), Dimensions::Xyz);
        assert_eq!(collection.parts()[0], Geom::Point(Point::new_z(1.0, 2.0, 3.0)));
        assert_eq!(collection.parts()[1].kind(), GeometryKind::Polygon);
        assert_eq!(
            collection.parts()[2].kind(),
            GeometryKind::MultiLineString
        );
    }

    #[test]
    fn conversion_errors() {
        let point = geojson::Geometry::new(Value::Point(vec![1.0, 2.0]));
        assert_matches!(
            GeometryCollection::try_from(point.clone()),
            Err(GeometryError::Conversion(_))
        );
        assert_eq!(Geom::try_from(point).unwrap(), Geom::Point(Point::new(1.0, 2.0)));

        let invalid = geojson::Geometry::new(Value::LineString(vec![vec![1.0], vec![2.0, 3.0]]));
        assert_matches!(Geom::try_from(invalid), Err(GeometryError::Conversion(_)));
    }
}
