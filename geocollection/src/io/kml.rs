use crate::collection::GeometryCollection;
use crate::config::ExportOptions;
use crate::error::GeometryError;
use crate::geometry::{Geom, Geometry};
use crate::impls::{LineString, Polygon};
use crate::io::format;
use crate::io::xml::XmlOutput;
use crate::point::Point;

const MIN_RING_POINTS: usize = 4;

impl GeometryCollection {
    /// Writes the collection as a KML `MultiGeometry` with the default options.
    pub fn to_kml(&self) -> Result<String, GeometryError> {
        self.to_kml_with(&ExportOptions::default())
    }

    /// Writes the collection as a KML `MultiGeometry`. Curves are segmentized with the tolerance from the
    /// options.
    pub fn to_kml_with(&self, options: &ExportOptions) -> Result<String, GeometryError> {
        let mut xml = XmlOutput::new();
        write_collection(&mut xml, self, options)?;
        xml.finish()
    }
}

impl Geom {
    /// Writes the geometry as a KML fragment.
    pub fn to_kml_with(&self, options: &ExportOptions) -> Result<String, GeometryError> {
        let mut xml = XmlOutput::new();
        write_geometry(&mut xml, self, options)?;
        xml.finish()
    }
}

fn write_geometry(
    xml: &mut XmlOutput,
    geometry: &Geom,
    options: &ExportOptions,
) -> Result<(), GeometryError> {
    match geometry {
        Geom::Point(point) => write_point(xml, point, options),
        Geom::LineString(line) => write_line(xml, line, options),
        Geom::Polygon(polygon) => write_polygon(xml, polygon, options),
        Geom::GeometryCollection(collection) => write_collection(xml, collection, options),
        curved => write_geometry(xml, &curved.segmentize(options.segmentation), options),
    }
}

fn write_collection(
    xml: &mut XmlOutput,
    collection: &GeometryCollection,
    options: &ExportOptions,
) -> Result<(), GeometryError> {
    if collection.num_geometries() == 0 {
        return xml.empty("MultiGeometry");
    }

    xml.start("MultiGeometry")?;
    for part in collection.parts() {
        write_geometry(xml, part, options)?;
    }
    xml.end("MultiGeometry")
}

fn write_point(
    xml: &mut XmlOutput,
    point: &Point,
    options: &ExportOptions,
) -> Result<(), GeometryError> {
    xml.start("Point")?;
    if !point.is_empty() {
        xml.element(
            "coordinates",
            &format::ordinates(point, point.z().is_some(), false, ",", options.precision),
        )?;
    }
    xml.end("Point")
}

/// Closed lines with enough vertices are written as `LinearRing`.
fn write_line(
    xml: &mut XmlOutput,
    line: &LineString,
    options: &ExportOptions,
) -> Result<(), GeometryError> {
    let name = if line.is_closed() && line.num_points() >= MIN_RING_POINTS {
        "LinearRing"
    } else {
        "LineString"
    };

    let altitude_mode = if line.dimensions().has_z() {
        "absolute"
    } else {
        "clampToGround"
    };

    xml.start(name)?;
    xml.element("altitudeMode", altitude_mode)?;
    xml.element(
        "coordinates",
        &format::sequence(line.points(), true, false, ",", " ", options.precision),
    )?;
    xml.end(name)
}

fn write_polygon(
    xml: &mut XmlOutput,
    polygon: &Polygon,
    options: &ExportOptions,
) -> Result<(), GeometryError> {
    xml.start("Polygon")?;
    for (index, ring) in polygon.rings().iter().enumerate() {
        let boundary = if index == 0 {
            "outerBoundaryIs"
        } else {
            "innerBoundaryIs"
        };
        xml.start(boundary)?;
        write_line(xml, ring, options)?;
        xml.end(boundary)?;
    }
    xml.end("Polygon")
}
