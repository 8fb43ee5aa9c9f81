use crate::collection::GeometryCollection;
use crate::config::ExportOptions;
use crate::error::GeometryError;
use crate::geometry::{Geom, Geometry};
use crate::impls::{CircularString, CompoundCurve, Curve, LineString, Polygon, Ring};
use crate::io::format;
use crate::io::xml::XmlOutput;
use crate::point::Point;
use crate::wkb_type::{Dimensions, GeometryKind};

/// Version of the GML encoding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GmlVersion {
    /// GML 2: `coordinates` lists, no curves.
    V2,
    /// GML 3: `pos` and `posList`, circular arcs as `ArcString`.
    #[default]
    V3,
}

impl GeometryCollection {
    /// Writes the collection as a GML 2 fragment with the default options.
    pub fn to_gml2(&self) -> Result<String, GeometryError> {
        self.to_gml_with(GmlVersion::V2, &ExportOptions::default())
    }

    /// Writes the collection as a GML 3 fragment with the default options.
    pub fn to_gml3(&self) -> Result<String, GeometryError> {
        self.to_gml_with(GmlVersion::V3, &ExportOptions::default())
    }

    /// Writes the collection as a GML fragment. Elements use the `gml` namespace prefix; the namespace itself
    /// is expected to be declared by the enclosing document.
    ///
    /// An empty collection is written as a single self-closed element.
    pub fn to_gml_with(
        &self,
        version: GmlVersion,
        options: &ExportOptions,
    ) -> Result<String, GeometryError> {
        let mut xml = XmlOutput::new();
        GmlWriter {
            xml: &mut xml,
            version,
            options,
        }
        .collection(self)?;
        xml.finish()
    }
}

impl Geom {
    /// Writes the geometry as a GML fragment.
    pub fn to_gml_with(
        &self,
        version: GmlVersion,
        options: &ExportOptions,
    ) -> Result<String, GeometryError> {
        let mut xml = XmlOutput::new();
        GmlWriter {
            xml: &mut xml,
            version,
            options,
        }
        .geometry(self)?;
        xml.finish()
    }
}

struct GmlWriter<'a> {
    xml: &'a mut XmlOutput,
    version: GmlVersion,
    options: &'a ExportOptions,
}

impl GmlWriter<'_> {
    fn geometry(&mut self, geometry: &Geom) -> Result<(), GeometryError> {
        if self.version == GmlVersion::V2 && geometry.has_curved_segments() {
            let linear = geometry.segmentize(self.options.segmentation);
            return self.geometry(&linear);
        }

        match geometry {
            Geom::Point(point) => self.point(point),
            Geom::LineString(line) => self.line_string(line),
            Geom::CircularString(arcs) => self.circular_string(arcs),
            Geom::CompoundCurve(compound) => self.compound_curve(compound),
            Geom::Polygon(polygon) => self.polygon(polygon, |w, ring| w.linear_ring(ring)),
            Geom::CurvePolygon(polygon) => self.polygon(polygon, |w, ring| w.curve_ring(ring)),
            Geom::GeometryCollection(collection) => self.collection(collection),
        }
    }

    fn collection(&mut self, collection: &GeometryCollection) -> Result<(), GeometryError> {
        let (name, member) = self.collection_names(collection.wkb_type().kind);
        if collection.num_geometries() == 0 {
            return self.xml.empty(name);
        }

        self.xml.start(name)?;
        for part in collection.parts() {
            self.xml.start(member)?;
            self.geometry(part)?;
            self.xml.end(member)?;
        }
        self.xml.end(name)
    }

    fn collection_names(&self, kind: GeometryKind) -> (&'static str, &'static str) {
        match (self.version, kind) {
            (_, GeometryKind::MultiPoint) => ("gml:MultiPoint", "gml:pointMember"),
            (GmlVersion::V2, GeometryKind::MultiLineString | GeometryKind::MultiCurve) => {
                ("gml:MultiLineString", "gml:lineStringMember")
            }
            (GmlVersion::V2, GeometryKind::MultiPolygon | GeometryKind::MultiSurface) => {
                ("gml:MultiPolygon", "gml:polygonMember")
            }
            (GmlVersion::V3, GeometryKind::MultiLineString | GeometryKind::MultiCurve) => {
                ("gml:MultiCurve", "gml:curveMember")
            }
            (GmlVersion::V3, GeometryKind::MultiPolygon | GeometryKind::MultiSurface) => {
                ("gml:MultiSurface", "gml:surfaceMember")
            }
            _ => ("gml:MultiGeometry", "gml:geometryMember"),
        }
    }

    fn point(&mut self, point: &Point) -> Result<(), GeometryError> {
        self.xml.start("gml:Point")?;
        if !point.is_empty() {
            let dimensions = point.dimensions();
            match self.version {
                GmlVersion::V2 => self.coordinates(std::slice::from_ref(point), dimensions)?,
                GmlVersion::V3 => {
                    let text = self.sequence(std::slice::from_ref(point), dimensions);
                    self.xml.element_with(
                        "gml:pos",
                        &[("srsDimension", srs_dimension(dimensions))],
                        &text,
                    )?;
                }
            }
        }
        self.xml.end("gml:Point")
    }

    fn line_string(&mut self, line: &LineString) -> Result<(), GeometryError> {
        self.xml.start("gml:LineString")?;
        self.points(line.points(), line.dimensions())?;
        self.xml.end("gml:LineString")
    }

    fn circular_string(&mut self, arcs: &CircularString) -> Result<(), GeometryError> {
        self.xml.start("gml:Curve")?;
        self.xml.start("gml:segments")?;
        self.xml.start("gml:ArcString")?;
        self.points(arcs.points(), arcs.dimensions())?;
        self.xml.end("gml:ArcString")?;
        self.xml.end("gml:segments")?;
        self.xml.end("gml:Curve")
    }

    fn compound_curve(&mut self, compound: &CompoundCurve) -> Result<(), GeometryError> {
        self.xml.start("gml:CompositeCurve")?;
        for curve in compound.curves() {
            self.xml.start("gml:curveMember")?;
            self.curve(curve)?;
            self.xml.end("gml:curveMember")?;
        }
        self.xml.end("gml:CompositeCurve")
    }

    fn curve(&mut self, curve: &Curve) -> Result<(), GeometryError> {
        match curve {
            Curve::LineString(line) => self.line_string(line),
            Curve::CircularString(arcs) => self.circular_string(arcs),
            Curve::CompoundCurve(compound) => self.compound_curve(compound),
        }
    }

    fn polygon<R: Ring>(
        &mut self,
        polygon: &Polygon<R>,
        mut ring_writer: impl FnMut(&mut Self, &R) -> Result<(), GeometryError>,
    ) -> Result<(), GeometryError> {
        let (exterior, interior) = match self.version {
            GmlVersion::V2 => ("gml:outerBoundaryIs", "gml:innerBoundaryIs"),
            GmlVersion::V3 => ("gml:exterior", "gml:interior"),
        };

        self.xml.start("gml:Polygon")?;
        for (index, ring) in polygon.rings().iter().enumerate() {
            let name = if index == 0 { exterior } else { interior };
            self.xml.start(name)?;
            ring_writer(self, ring)?;
            self.xml.end(name)?;
        }
        self.xml.end("gml:Polygon")
    }

    fn linear_ring(&mut self, ring: &LineString) -> Result<(), GeometryError> {
        self.xml.start("gml:LinearRing")?;
        self.points(ring.points(), ring.dimensions())?;
        self.xml.end("gml:LinearRing")
    }

    fn curve_ring(&mut self, ring: &Curve) -> Result<(), GeometryError> {
        match ring {
            Curve::LineString(line) => self.linear_ring(line),
            curve => {
                self.xml.start("gml:Ring")?;
                self.xml.start("gml:curveMember")?;
                self.curve(curve)?;
                self.xml.end("gml:curveMember")?;
                self.xml.end("gml:Ring")
            }
        }
    }

    fn points(&mut self, points: &[Point], dimensions: Dimensions) -> Result<(), GeometryError> {
        match self.version {
            GmlVersion::V2 => self.coordinates(points, dimensions),
            GmlVersion::V3 => {
                let text = self.sequence(points, dimensions);
                self.xml.element_with(
                    "gml:posList",
                    &[("srsDimension", srs_dimension(dimensions))],
                    &text,
                )
            }
        }
    }

    fn coordinates(
        &mut self,
        points: &[Point],
        dimensions: Dimensions,
    ) -> Result<(), GeometryError> {
        let text = format::sequence(
            points,
            dimensions.has_z(),
            false,
            ",",
            " ",
            self.options.precision,
        );
        self.xml
            .element_with("gml:coordinates", &[("cs", ","), ("ts", " ")], &text)
    }

    fn sequence(&self, points: &[Point], dimensions: Dimensions) -> String {
        format::sequence(
            points,
            dimensions.has_z(),
            false,
            " ",
            " ",
            self.options.precision,
        )
    }
}

fn srs_dimension(dimensions: Dimensions) -> &'static str {
    if dimensions.has_z() {
        "3"
    } else {
        "2"
    }
}
