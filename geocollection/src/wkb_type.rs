//! Geometry type tags: base kind plus coordinate dimensionality.

use std::fmt::{Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

const EWKB_Z_FLAG: u32 = 0x8000_0000;
const EWKB_M_FLAG: u32 = 0x4000_0000;
const EWKB_SRID_FLAG: u32 = 0x2000_0000;
const EWKB_FLAGS: u32 = EWKB_Z_FLAG | EWKB_M_FLAG | EWKB_SRID_FLAG;

/// Base geometry kind, numbered as in the OGC simple features WKB encoding.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    TryFromPrimitive,
    IntoPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u32)]
pub enum GeometryKind {
    /// Single point.
    Point = 1,
    /// Chain of straight segments.
    LineString = 2,
    /// Surface bounded by linear rings.
    Polygon = 3,
    /// Collection of points.
    MultiPoint = 4,
    /// Collection of line strings.
    MultiLineString = 5,
    /// Collection of polygons.
    MultiPolygon = 6,
    /// Collection of arbitrary geometries.
    GeometryCollection = 7,
    /// Chain of circular arcs defined by three points each.
    CircularString = 8,
    /// Chain of linear and circular curves.
    CompoundCurve = 9,
    /// Surface bounded by arbitrary curves.
    CurvePolygon = 10,
    /// Collection of curves.
    MultiCurve = 11,
    /// Collection of surfaces.
    MultiSurface = 12,
}

impl GeometryKind {
    /// Upper case WKT tag of the kind.
    pub fn wkt_name(&self) -> &'static str {
        match self {
            Self::Point => "POINT",
            Self::LineString => "LINESTRING",
            Self::Polygon => "POLYGON",
            Self::MultiPoint => "MULTIPOINT",
            Self::MultiLineString => "MULTILINESTRING",
            Self::MultiPolygon => "MULTIPOLYGON",
            Self::GeometryCollection => "GEOMETRYCOLLECTION",
            Self::CircularString => "CIRCULARSTRING",
            Self::CompoundCurve => "COMPOUNDCURVE",
            Self::CurvePolygon => "CURVEPOLYGON",
            Self::MultiCurve => "MULTICURVE",
            Self::MultiSurface => "MULTISURFACE",
        }
    }

    /// Looks up a kind by its WKT tag, ignoring case.
    pub fn from_wkt_name(name: &str) -> Option<Self> {
        const ALL: [GeometryKind; 12] = [
            GeometryKind::Point,
            GeometryKind::LineString,
            GeometryKind::Polygon,
            GeometryKind::MultiPoint,
            GeometryKind::MultiLineString,
            GeometryKind::MultiPolygon,
            GeometryKind::GeometryCollection,
            GeometryKind::CircularString,
            GeometryKind::CompoundCurve,
            GeometryKind::CurvePolygon,
            GeometryKind::MultiCurve,
            GeometryKind::MultiSurface,
        ];

        ALL.into_iter()
            .find(|kind| kind.wkt_name().eq_ignore_ascii_case(name))
    }

    /// Returns true for the collection kinds (geometry collection and all multi-geometries).
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            Self::MultiPoint
                | Self::MultiLineString
                | Self::MultiPolygon
                | Self::GeometryCollection
                | Self::MultiCurve
                | Self::MultiSurface
        )
    }

    /// Returns true if a collection of this kind may hold a part of the `part` kind.
    ///
    /// Non-collection kinds accept nothing.
    pub fn accepts(&self, part: GeometryKind) -> bool {
        match self {
            Self::GeometryCollection => true,
            Self::MultiPoint => part == Self::Point,
            Self::MultiLineString => part == Self::LineString,
            Self::MultiPolygon => part == Self::Polygon,
            Self::MultiCurve => matches!(
                part,
                Self::LineString | Self::CircularString | Self::CompoundCurve
            ),
            Self::MultiSurface => matches!(part, Self::Polygon | Self::CurvePolygon),
            _ => false,
        }
    }

    /// Kind of the parts that a multi-geometry writes without a WKT tag.
    pub(crate) fn untagged_part(&self) -> Option<GeometryKind> {
        match self {
            Self::MultiPoint => Some(Self::Point),
            Self::MultiLineString | Self::MultiCurve => Some(Self::LineString),
            Self::MultiPolygon | Self::MultiSurface => Some(Self::Polygon),
            _ => None,
        }
    }

    /// Collection kind with curved parts allowed.
    pub(crate) fn curved(&self) -> Self {
        match self {
            Self::MultiLineString => Self::MultiCurve,
            Self::MultiPolygon => Self::MultiSurface,
            other => *other,
        }
    }

    /// Collection kind with curved parts replaced by linear ones.
    pub(crate) fn linear(&self) -> Self {
        match self {
            Self::MultiCurve => Self::MultiLineString,
            Self::MultiSurface => Self::MultiPolygon,
            other => *other,
        }
    }
}

/// Set of ordinates each vertex of a geometry carries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimensions {
    /// X and Y only.
    #[default]
    Xy,
    /// X, Y and elevation.
    Xyz,
    /// X, Y and measure.
    Xym,
    /// X, Y, elevation and measure.
    Xyzm,
}

impl Dimensions {
    /// Creates the dimensions from the presence of the Z and M ordinates.
    pub fn new(has_z: bool, has_m: bool) -> Self {
        match (has_z, has_m) {
            (false, false) => Self::Xy,
            (true, false) => Self::Xyz,
            (false, true) => Self::Xym,
            (true, true) => Self::Xyzm,
        }
    }

    /// True if Z is present.
    pub fn has_z(&self) -> bool {
        matches!(self, Self::Xyz | Self::Xyzm)
    }

    /// True if M is present.
    pub fn has_m(&self) -> bool {
        matches!(self, Self::Xym | Self::Xyzm)
    }

    /// Same dimensions with Z added or removed.
    pub fn with_z(self, has_z: bool) -> Self {
        Self::new(has_z, self.has_m())
    }

    /// Same dimensions with M added or removed.
    pub fn with_m(self, has_m: bool) -> Self {
        Self::new(self.has_z(), has_m)
    }

    /// Number of ordinates per vertex.
    pub fn size(&self) -> usize {
        2 + self.has_z() as usize + self.has_m() as usize
    }

    /// WKT dimension tag (`Z`, `M`, `ZM`), empty for 2D.
    pub fn wkt_tag(&self) -> &'static str {
        match self {
            Self::Xy => "",
            Self::Xyz => "Z",
            Self::Xym => "M",
            Self::Xyzm => "ZM",
        }
    }

    fn iso_offset(&self) -> u32 {
        match self {
            Self::Xy => 0,
            Self::Xyz => 1000,
            Self::Xym => 2000,
            Self::Xyzm => 3000,
        }
    }
}

/// Geometry type tag: kind plus dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WkbType {
    /// Base kind.
    pub kind: GeometryKind,
    /// Ordinates carried by the vertices.
    pub dimensions: Dimensions,
}

/// Result of decoding a WKB type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DecodedType {
    pub wkb_type: WkbType,
    pub has_srid: bool,
}

impl WkbType {
    /// Creates a new type tag.
    pub const fn new(kind: GeometryKind, dimensions: Dimensions) -> Self {
        Self { kind, dimensions }
    }

    /// 2D tag of the given kind.
    pub const fn flat(kind: GeometryKind) -> Self {
        Self::new(kind, Dimensions::Xy)
    }

    /// True if the type carries Z.
    pub fn has_z(&self) -> bool {
        self.dimensions.has_z()
    }

    /// True if the type carries M.
    pub fn has_m(&self) -> bool {
        self.dimensions.has_m()
    }

    /// ISO SQL/MM type code (`1007` for `GeometryCollection Z` etc).
    pub fn iso_code(&self) -> u32 {
        u32::from(self.kind) + self.dimensions.iso_offset()
    }

    /// PostGIS extended type code with high bit dimension flags.
    pub fn extended_code(&self) -> u32 {
        let mut code = u32::from(self.kind);
        if self.has_z() {
            code |= EWKB_Z_FLAG;
        }
        if self.has_m() {
            code |= EWKB_M_FLAG;
        }

        code
    }

    /// Decodes either an ISO or an extended type code.
    pub fn from_code(code: u32) -> Result<Self, GeometryError> {
        Ok(Self::decode(code)?.wkb_type)
    }

    pub(crate) fn decode(code: u32) -> Result<DecodedType, GeometryError> {
        let base = code & !EWKB_FLAGS;
        let (iso_z, iso_m) = match base / 1000 {
            0 => (false, false),
            1 => (true, false),
            2 => (false, true),
            3 => (true, true),
            _ => return Err(GeometryError::UnknownWkbType(code)),
        };

        let kind = GeometryKind::try_from(base % 1000)
            .map_err(|_| GeometryError::UnknownWkbType(code))?;
        let has_z = iso_z || code & EWKB_Z_FLAG != 0;
        let has_m = iso_m || code & EWKB_M_FLAG != 0;

        Ok(DecodedType {
            wkb_type: Self::new(kind, Dimensions::new(has_z, has_m)),
            has_srid: code & EWKB_SRID_FLAG != 0,
        })
    }

    /// WKT tag, e.g. `GEOMETRYCOLLECTION ZM`.
    pub fn wkt_tag(&self) -> String {
        match self.dimensions {
            Dimensions::Xy => self.kind.wkt_name().to_string(),
            dims => format!("{} {}", self.kind.wkt_name(), dims.wkt_tag()),
        }
    }
}

impl Display for WkbType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.wkt_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn iso_codes() {
        let gc = WkbType::new(GeometryKind::GeometryCollection, Dimensions::Xyzm);
        assert_eq!(gc.iso_code(), 3007);
        assert_eq!(WkbType::from_code(3007).unwrap(), gc);
        assert_eq!(
            WkbType::from_code(1002).unwrap(),
            WkbType::new(GeometryKind::LineString, Dimensions::Xyz)
        );
    }

    #[test]
    fn extended_codes() {
        let ls = WkbType::new(GeometryKind::LineString, Dimensions::Xym);
        assert_eq!(ls.extended_code(), 0x4000_0002);
        assert_eq!(WkbType::from_code(0x4000_0002).unwrap(), ls);

        let decoded = WkbType::decode(0xA000_0001).unwrap();
        assert!(decoded.has_srid);
        assert_eq!(
            decoded.wkb_type,
            WkbType::new(GeometryKind::Point, Dimensions::Xyz)
        );
    }

    #[test]
    fn unknown_codes() {
        assert_matches!(
            WkbType::from_code(13),
            Err(GeometryError::UnknownWkbType(13))
        );
        assert_matches!(
            WkbType::from_code(4001),
            Err(GeometryError::UnknownWkbType(4001))
        );
    }

    #[test]
    fn wkt_names() {
        assert_eq!(
            GeometryKind::from_wkt_name("GeometryCollection"),
            Some(GeometryKind::GeometryCollection)
        );
        assert_eq!(GeometryKind::from_wkt_name("linestringzm"), None);
        assert_eq!(
            WkbType::new(GeometryKind::LineString, Dimensions::Xyzm).to_string(),
            "LINESTRING ZM"
        );
    }

    #[test]
    fn typed_collections_accept_parts() {
        assert!(GeometryKind::GeometryCollection.accepts(GeometryKind::Polygon));
        assert!(GeometryKind::MultiCurve.accepts(GeometryKind::CircularString));
        assert!(!GeometryKind::MultiPoint.accepts(GeometryKind::LineString));
        assert!(!GeometryKind::LineString.accepts(GeometryKind::Point));
    }
}
