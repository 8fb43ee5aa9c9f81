use std::io::{Cursor, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::collection::GeometryCollection;
use crate::config::{ExportOptions, WkbFlavor};
use crate::error::GeometryError;
use crate::geometry::{Geom, Geometry};
use crate::impls::{CircularString, CompoundCurve, Curve, CurvePolygon, LineString, Polygon};
use crate::io::MAX_NESTING_DEPTH;
use crate::point::Point;
use crate::wkb_type::{Dimensions, GeometryKind, WkbType};

const HEADER_BYTES: usize = 1 + 4;
const COUNT_BYTES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
enum Endianness {
    BigEndian = 0,
    LittleEndian = 1,
}

impl GeometryCollection {
    /// Encodes the collection as little endian WKB with ISO type codes.
    pub fn to_wkb(&self) -> Result<Vec<u8>, GeometryError> {
        self.to_wkb_with(&ExportOptions::default())
    }

    /// Encodes the collection as little endian WKB with the type codes selected by the options.
    pub fn to_wkb_with(&self, options: &ExportOptions) -> Result<Vec<u8>, GeometryError> {
        let mut buffer = Vec::with_capacity(self.wkb_size());
        write_collection(&mut buffer, self, options.wkb_flavor)?;
        Ok(buffer)
    }

    /// Number of bytes in the WKB encoding of the collection.
    pub fn wkb_size(&self) -> usize {
        collection_size(self)
    }

    /// Replaces the content of the collection with the decoded WKB.
    ///
    /// The encoded geometry must be of the same kind as the declared kind of the collection. Its dimensions
    /// replace the declared ones. If decoding fails, the collection is left empty with its declared type
    /// unchanged.
    pub fn from_wkb(&mut self, wkb: &[u8]) -> Result<(), GeometryError> {
        let declared = self.wkb_type();
        let decoded = WkbReader::new(wkb)
            .geometry()
            .and_then(|geometry| match geometry {
                Geom::GeometryCollection(collection)
                    if collection.wkb_type().kind == declared.kind =>
                {
                    Ok(collection)
                }
                other => Err(GeometryError::UnexpectedType {
                    expected: declared,
                    found: other.wkb_type(),
                }),
            });

        match decoded {
            Ok(collection) => {
                *self = collection;
                Ok(())
            }
            Err(err) => {
                log::debug!("Failed to decode WKB of {declared} collection: {err}");
                self.clear();
                Err(err)
            }
        }
    }
}

impl Geom {
    /// Encodes the geometry as WKB.
    pub fn to_wkb_with(&self, options: &ExportOptions) -> Result<Vec<u8>, GeometryError> {
        let mut buffer = Vec::with_capacity(self.wkb_size());
        write_geometry(&mut buffer, self, options.wkb_flavor)?;
        Ok(buffer)
    }

    /// Number of bytes in the WKB encoding of the geometry.
    pub fn wkb_size(&self) -> usize {
        geometry_size(self)
    }

    /// Decodes a geometry of any supported kind. Bytes after the end of the geometry are ignored.
    pub fn from_wkb(wkb: &[u8]) -> Result<Self, GeometryError> {
        WkbReader::new(wkb).geometry()
    }
}

fn type_code(wkb_type: WkbType, flavor: WkbFlavor) -> u32 {
    match flavor {
        WkbFlavor::Iso => wkb_type.iso_code(),
        WkbFlavor::Extended => wkb_type.extended_code(),
    }
}

fn write_header<W: Write>(
    writer: &mut W,
    wkb_type: WkbType,
    flavor: WkbFlavor,
) -> Result<(), GeometryError> {
    writer.write_u8(Endianness::LittleEndian.into())?;
    writer.write_u32::<LittleEndian>(type_code(wkb_type, flavor))?;
    Ok(())
}

fn write_count<W: Write>(writer: &mut W, count: usize) -> Result<(), GeometryError> {
    let count = u32::try_from(count)
        .map_err(|_| GeometryError::Conversion(format!("{count} elements do not fit into WKB")))?;
    writer.write_u32::<LittleEndian>(count)?;
    Ok(())
}

fn write_coordinate<W: Write>(
    writer: &mut W,
    point: &Point,
    dimensions: Dimensions,
) -> Result<(), GeometryError> {
    writer.write_f64::<LittleEndian>(point.x())?;
    writer.write_f64::<LittleEndian>(point.y())?;
    if dimensions.has_z() {
        writer.write_f64::<LittleEndian>(point.z().unwrap_or(f64::NAN))?;
    }
    if dimensions.has_m() {
        writer.write_f64::<LittleEndian>(point.m().unwrap_or(f64::NAN))?;
    }

    Ok(())
}

fn write_sequence<W: Write>(
    writer: &mut W,
    points: &[Point],
    dimensions: Dimensions,
) -> Result<(), GeometryError> {
    write_count(writer, points.len())?;
    for point in points {
        write_coordinate(writer, point, dimensions)?;
    }

    Ok(())
}

fn write_geometry<W: Write>(
    writer: &mut W,
    geometry: &Geom,
    flavor: WkbFlavor,
) -> Result<(), GeometryError> {
    match geometry {
        Geom::Point(point) => {
            write_header(writer, geometry.wkb_type(), flavor)?;
            write_coordinate(writer, point, point.dimensions())
        }
        Geom::LineString(line) => {
            write_header(writer, geometry.wkb_type(), flavor)?;
            write_sequence(writer, line.points(), line.dimensions())
        }
        Geom::CircularString(arcs) => {
            write_header(writer, geometry.wkb_type(), flavor)?;
            write_sequence(writer, arcs.points(), arcs.dimensions())
        }
        Geom::CompoundCurve(compound) => {
            write_header(writer, geometry.wkb_type(), flavor)?;
            write_count(writer, compound.num_curves())?;
            for curve in compound.curves() {
                write_geometry(writer, &Geom::from(curve.clone()), flavor)?;
            }
            Ok(())
        }
        Geom::Polygon(polygon) => {
            write_header(writer, geometry.wkb_type(), flavor)?;
            write_count(writer, polygon.rings().len())?;
            for ring in polygon.rings() {
                write_sequence(writer, ring.points(), polygon.dimensions())?;
            }
            Ok(())
        }
        Geom::CurvePolygon(polygon) => {
            write_header(writer, geometry.wkb_type(), flavor)?;
            write_count(writer, polygon.rings().len())?;
            for ring in polygon.rings() {
                write_geometry(writer, &Geom::from(ring.clone()), flavor)?;
            }
            Ok(())
        }
        Geom::GeometryCollection(collection) => write_collection(writer, collection, flavor),
    }
}

fn write_collection<W: Write>(
    writer: &mut W,
    collection: &GeometryCollection,
    flavor: WkbFlavor,
) -> Result<(), GeometryError> {
    write_header(writer, collection.wkb_type(), flavor)?;
    write_count(writer, collection.num_geometries())?;
    for part in collection.parts() {
        write_geometry(writer, part, flavor)?;
    }

    Ok(())
}

fn sequence_size(points: usize, dimensions: Dimensions) -> usize {
    COUNT_BYTES + points * dimensions.size() * 8
}

fn curve_size(curve: &Curve) -> usize {
    match curve {
        Curve::LineString(line) => {
            HEADER_BYTES + sequence_size(line.num_points(), line.dimensions())
        }
        Curve::CircularString(arcs) => {
            HEADER_BYTES + sequence_size(arcs.num_points(), arcs.dimensions())
        }
        Curve::CompoundCurve(compound) => compound_size(compound),
    }
}

fn compound_size(compound: &CompoundCurve) -> usize {
    HEADER_BYTES + COUNT_BYTES + compound.curves().iter().map(curve_size).sum::<usize>()
}

fn geometry_size(geometry: &Geom) -> usize {
    match geometry {
        Geom::Point(point) => HEADER_BYTES + point.dimensions().size() * 8,
        Geom::LineString(line) => {
            HEADER_BYTES + sequence_size(line.num_points(), line.dimensions())
        }
        Geom::CircularString(arcs) => {
            HEADER_BYTES + sequence_size(arcs.num_points(), arcs.dimensions())
        }
        Geom::CompoundCurve(compound) => compound_size(compound),
        Geom::Polygon(polygon) => {
            HEADER_BYTES
                + COUNT_BYTES
                + polygon
                    .rings()
                    .iter()
                    .map(|ring| sequence_size(ring.num_points(), polygon.dimensions()))
                    .sum::<usize>()
        }
        Geom::CurvePolygon(polygon) => {
            HEADER_BYTES + COUNT_BYTES + polygon.rings().iter().map(curve_size).sum::<usize>()
        }
        Geom::GeometryCollection(collection) => collection_size(collection),
    }
}

fn collection_size(collection: &GeometryCollection) -> usize {
    HEADER_BYTES + COUNT_BYTES + collection.parts().iter().map(geometry_size).sum::<usize>()
}

/// Bounds checked reader over a WKB buffer.
struct WkbReader<'a> {
    cursor: Cursor<&'a [u8]>,
    depth: usize,
}

impl<'a> WkbReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(buf),
            depth: 0,
        }
    }

    fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.position())
    }

    fn read_endianness(&mut self) -> Result<Endianness, GeometryError> {
        let position = self.position();
        let marker = self
            .cursor
            .read_u8()
            .map_err(|_| GeometryError::UnexpectedEof(position))?;
        Endianness::try_from(marker).map_err(|_| GeometryError::InvalidByteOrder(marker))
    }

    fn read_u32(&mut self, endianness: Endianness) -> Result<u32, GeometryError> {
        let position = self.position();
        match endianness {
            Endianness::BigEndian => self.cursor.read_u32::<BigEndian>(),
            Endianness::LittleEndian => self.cursor.read_u32::<LittleEndian>(),
        }
        .map_err(|_| GeometryError::UnexpectedEof(position))
    }

    fn read_f64(&mut self, endianness: Endianness) -> Result<f64, GeometryError> {
        let position = self.position();
        match endianness {
            Endianness::BigEndian => self.cursor.read_f64::<BigEndian>(),
            Endianness::LittleEndian => self.cursor.read_f64::<LittleEndian>(),
        }
        .map_err(|_| GeometryError::UnexpectedEof(position))
    }

    /// Reads an element count. Fails early if the buffer cannot hold that many elements of `min_size` bytes.
    fn read_count(
        &mut self,
        endianness: Endianness,
        min_size: usize,
    ) -> Result<usize, GeometryError> {
        let count = self.read_u32(endianness)? as usize;
        if count.saturating_mul(min_size) > self.remaining() {
            return Err(GeometryError::UnexpectedEof(self.cursor.get_ref().len()));
        }

        Ok(count)
    }

    fn read_point(
        &mut self,
        endianness: Endianness,
        dimensions: Dimensions,
    ) -> Result<Point, GeometryError> {
        let x = self.read_f64(endianness)?;
        let y = self.read_f64(endianness)?;
        let mut point = Point::new(x, y);
        if dimensions.has_z() {
            point.set_z(Some(self.read_f64(endianness)?));
        }
        if dimensions.has_m() {
            point.set_m(Some(self.read_f64(endianness)?));
        }

        Ok(point)
    }

    fn read_sequence(
        &mut self,
        endianness: Endianness,
        dimensions: Dimensions,
    ) -> Result<Vec<Point>, GeometryError> {
        let count = self.read_count(endianness, dimensions.size() * 8)?;
        (0..count)
            .map(|_| self.read_point(endianness, dimensions))
            .collect()
    }

    fn geometry(&mut self) -> Result<Geom, GeometryError> {
        if self.depth == MAX_NESTING_DEPTH {
            return Err(GeometryError::wkb(self.position(), "geometries are nested too deep"));
        }

        self.depth += 1;
        let geometry = self.read_geometry();
        self.depth -= 1;
        geometry
    }

    fn read_geometry(&mut self) -> Result<Geom, GeometryError> {
        let start = self.position();
        let endianness = self.read_endianness()?;
        let decoded = WkbType::decode(self.read_u32(endianness)?)?;
        if decoded.has_srid {
            self.read_u32(endianness)?;
        }

        let wkb_type = decoded.wkb_type;
        let dimensions = wkb_type.dimensions;
        let geometry = match wkb_type.kind {
            GeometryKind::Point => {
                let point = self.read_point(endianness, dimensions)?;
                if point.x().is_nan() && point.y().is_nan() {
                    Geom::Point(Point::empty(dimensions))
                } else {
                    Geom::Point(point)
                }
            }
            GeometryKind::LineString => Geom::LineString(LineString::with_dimensions(
                dimensions,
                self.read_sequence(endianness, dimensions)?,
            )),
            GeometryKind::CircularString => {
                let points = self.read_sequence(endianness, dimensions)?;
                if !CircularString::forms_arcs(points.len()) {
                    return Err(GeometryError::wkb(
                        start,
                        format!("circular string with {} vertices", points.len()),
                    ));
                }
                Geom::CircularString(CircularString::with_dimensions(dimensions, points))
            }
            GeometryKind::CompoundCurve => {
                let count = self.read_count(endianness, HEADER_BYTES + COUNT_BYTES)?;
                let mut compound = CompoundCurve::empty(dimensions);
                for _ in 0..count {
                    compound.add_curve(self.curve(wkb_type)?);
                }
                Geom::CompoundCurve(compound)
            }
            GeometryKind::Polygon => {
                let count = self.read_count(endianness, COUNT_BYTES)?;
                let mut polygon = Polygon::empty(dimensions);
                for index in 0..count {
                    let ring = LineString::with_dimensions(
                        dimensions,
                        self.read_sequence(endianness, dimensions)?,
                    );
                    if index == 0 {
                        polygon.set_exterior_ring(ring);
                    } else {
                        polygon.add_interior_ring(ring);
                    }
                }
                Geom::Polygon(polygon)
            }
            GeometryKind::CurvePolygon => {
                let count = self.read_count(endianness, HEADER_BYTES + COUNT_BYTES)?;
                let mut polygon = CurvePolygon::empty(dimensions);
                for index in 0..count {
                    let ring = self.curve(wkb_type)?;
                    if index == 0 {
                        polygon.set_exterior_ring(ring);
                    } else {
                        polygon.add_interior_ring(ring);
                    }
                }
                Geom::CurvePolygon(polygon)
            }
            _ => {
                let count = self.read_count(endianness, HEADER_BYTES)?;
                let mut collection = GeometryCollection::with_type(wkb_type)
                    .ok_or(GeometryError::UnknownWkbType(wkb_type.iso_code()))?;
                for _ in 0..count {
                    let part = self.geometry()?;
                    let found = part.wkb_type();
                    if !collection.add_geometry(part) {
                        return Err(GeometryError::UnexpectedType {
                            expected: wkb_type,
                            found,
                        });
                    }
                }
                Geom::GeometryCollection(collection)
            }
        };

        Ok(geometry)
    }

    fn curve(&mut self, parent: WkbType) -> Result<Curve, GeometryError> {
        Curve::try_from(self.geometry()?).map_err(|geometry| GeometryError::UnexpectedType {
            expected: parent,
            found: geometry.wkb_type(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::tests::line;
    use assert_matches::assert_matches;

    fn sample(dimensions: Dimensions) -> GeometryCollection {
        let point = |x: f64, y: f64| {
            let base = Point::new(x, y);
            match dimensions {
                Dimensions::Xy => base,
                Dimensions::Xyz => Point::new_z(x, y, x + y),
                Dimensions::Xym => Point::new_m(x, y, x - y),
                Dimensions::Xyzm => Point::new_zm(x, y, x + y, x - y),
            }
        };

        let mut collection = GeometryCollection::with_type(WkbType::new(
            GeometryKind::GeometryCollection,
            dimensions,
        ))
        .unwrap();
        collection.add_geometry(point(1.0, 2.0));
        collection.add_geometry(LineString::new(vec![
            point(0.0, 0.0),
            point(0.0, 10.0),
            point(10.0, 10.0),
        ]));
        collection.add_geometry(Polygon::new(
            LineString::new(vec![
                point(0.0, 0.0),
                point(0.0, 4.0),
                point(4.0, 4.0),
                point(0.0, 0.0),
            ]),
            vec![],
        ));
        collection.add_geometry(CircularString::new(vec![
            point(0.0, 0.0),
            point(1.0, 1.0),
            point(2.0, 0.0),
        ]));
        collection
    }

    #[test]
    fn round_trip_all_dimensions() {
        for dimensions in [Dimensions::Xy, Dimensions::Xyz, Dimensions::Xym, Dimensions::Xyzm] {
            let original = sample(dimensions);
            let wkb = original.to_wkb().unwrap();
            assert_eq!(wkb.len(), original.wkb_size());

            let mut decoded =
                GeometryCollection::with_type(WkbType::flat(GeometryKind::GeometryCollection))
                    .unwrap();
            decoded.from_wkb(&wkb).unwrap();
            assert_eq!(decoded, original, "{dimensions:?}");
        }
    }

    #[test]
    fn extended_codes_round_trip() {
        let original = sample(Dimensions::Xyzm);
        let options = ExportOptions {
            wkb_flavor: WkbFlavor::Extended,
            ..Default::default()
        };
        let wkb = original.to_wkb_with(&options).unwrap();
        assert_eq!(&wkb[1..5], &0xC000_0007_u32.to_le_bytes());

        let mut decoded = GeometryCollection::new();
        decoded.from_wkb(&wkb).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn header_layout() {
        let mut collection = GeometryCollection::new();
        collection.add_geometry(Point::new(1.0, 2.0));
        let wkb = collection.to_wkb().unwrap();

        let mut expected = vec![1u8, 7, 0, 0, 0, 1, 0, 0, 0, 1, 1, 0, 0, 0];
        expected.extend_from_slice(&1.0f64.to_le_bytes());
        expected.extend_from_slice(&2.0f64.to_le_bytes());
        assert_eq!(wkb, expected);

        assert_eq!(GeometryCollection::new().to_wkb().unwrap(), vec![1, 7, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn big_endian_with_srid() {
        let mut wkb = vec![0u8];
        wkb.extend_from_slice(&0x2000_0007_u32.to_be_bytes());
        wkb.extend_from_slice(&4326_u32.to_be_bytes());
        wkb.extend_from_slice(&1_u32.to_be_bytes());
        wkb.push(0);
        wkb.extend_from_slice(&1_u32.to_be_bytes());
        wkb.extend_from_slice(&3.5f64.to_be_bytes());
        wkb.extend_from_slice(&(-1.0f64).to_be_bytes());

        let mut collection = GeometryCollection::new();
        collection.from_wkb(&wkb).unwrap();
        assert_eq!(collection.num_geometries(), 1);
        assert_eq!(collection.parts()[0], Geom::Point(Point::new(3.5, -1.0)));
    }

    #[test]
    fn truncated_input() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut collection = GeometryCollection::new();
        collection.add_geometry(line(&[(0.0, 0.0), (1.0, 1.0)]));
        let wkb = collection.to_wkb().unwrap();

        for length in 0..wkb.len() {
            let mut decoded = GeometryCollection::new();
            decoded.add_geometry(Point::new(5.0, 5.0));
            assert!(decoded.from_wkb(&wkb[..length]).is_err(), "length {length}");
            assert!(decoded.is_empty());
            assert_eq!(decoded.wkb_type(), WkbType::flat(GeometryKind::GeometryCollection));
        }
    }

    #[test]
    fn huge_counts_are_rejected() {
        let mut wkb = vec![1u8, 7, 0, 0, 0];
        wkb.extend_from_slice(&u32::MAX.to_le_bytes());
        let mut collection = GeometryCollection::new();
        assert_matches!(collection.from_wkb(&wkb), Err(GeometryError::UnexpectedEof(_)));
    }

    #[test]
    fn wrong_type() {
        let point = Geom::Point(Point::new(1.0, 2.0))
            .to_wkb_with(&ExportOptions::default())
            .unwrap();
        let mut collection = GeometryCollection::new();
        assert_matches!(
            collection.from_wkb(&point),
            Err(GeometryError::UnexpectedType { .. })
        );

        let mut multi_point =
            GeometryCollection::with_type(WkbType::flat(GeometryKind::MultiPoint)).unwrap();
        let wkb = sample(Dimensions::Xy).to_wkb().unwrap();
        assert_matches!(
            multi_point.from_wkb(&wkb),
            Err(GeometryError::UnexpectedType { .. })
        );
        assert_eq!(multi_point.wkb_type(), WkbType::flat(GeometryKind::MultiPoint));
    }

    #[test]
    fn invalid_markers_and_codes() {
        let mut collection = GeometryCollection::new();
        assert_matches!(
            collection.from_wkb(&[2, 7, 0, 0, 0, 0, 0, 0, 0]),
            Err(GeometryError::InvalidByteOrder(2))
        );
        assert_matches!(
            collection.from_wkb(&[1, 99, 0, 0, 0, 0, 0, 0, 0]),
            Err(GeometryError::UnknownWkbType(99))
        );
        assert_matches!(collection.from_wkb(&[]), Err(GeometryError::UnexpectedEof(0)));
    }

    #[test]
    fn circular_string_counts() {
        let mut collection = GeometryCollection::new();
        collection.add_geometry(CircularString::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, 3.0),
        ]));
        let wkb = collection.to_wkb().unwrap();

        let mut decoded = GeometryCollection::new();
        decoded.add_geometry(Point::new(5.0, 5.0));
        assert_matches!(decoded.from_wkb(&wkb), Err(GeometryError::Wkb { position: 9, .. }));
        assert!(decoded.is_empty());

        let mut empty = GeometryCollection::new();
        empty.add_geometry(CircularString::empty(Dimensions::Xy));
        let wkb = empty.to_wkb().unwrap();
        decoded.from_wkb(&wkb).unwrap();
        assert_eq!(decoded, empty);
    }

    #[test]
    fn nesting_depth_is_limited() {
        let nested = |depth: usize| {
            let mut wkb = vec![];
            for _ in 0..depth - 1 {
                wkb.extend_from_slice(&[1, 7, 0, 0, 0, 1, 0, 0, 0]);
            }
            wkb.extend_from_slice(&[1, 7, 0, 0, 0, 0, 0, 0, 0]);
            wkb
        };

        let mut collection = GeometryCollection::new();
        collection.from_wkb(&nested(MAX_NESTING_DEPTH)).unwrap();
        assert_eq!(collection.num_geometries(), 1);

        assert_matches!(
            collection.from_wkb(&nested(MAX_NESTING_DEPTH + 1)),
            Err(GeometryError::Wkb { .. })
        );
        assert!(collection.is_empty());

        assert_matches!(
            collection.from_wkb(&nested(200_000)),
            Err(GeometryError::Wkb { .. })
        );
    }

    #[test]
    fn nested_curves() {
        let mut compound = CompoundCurve::from(CircularString::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
        ]));
        compound.add_curve(Curve::LineString(line(&[(2.0, 0.0), (0.0, 0.0)])));

        let mut collection =
            GeometryCollection::with_type(WkbType::flat(GeometryKind::MultiSurface)).unwrap();
        collection.add_geometry(CurvePolygon::new(Curve::CompoundCurve(compound), vec![]));
        collection.add_geometry(Polygon::new(
            line(&[(5.0, 5.0), (5.0, 6.0), (6.0, 6.0), (5.0, 5.0)]),
            vec![],
        ));

        let wkb = collection.to_wkb().unwrap();
        assert_eq!(wkb.len(), collection.wkb_size());

        let mut decoded =
            GeometryCollection::with_type(WkbType::flat(GeometryKind::MultiSurface)).unwrap();
        decoded.from_wkb(&wkb).unwrap();
        assert_eq!(decoded, collection);
    }
}
