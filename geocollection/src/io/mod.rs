//! Encoding and decoding of geometries.
//!
//! Binary (WKB) and text (WKT) encodings can be read and written. GML, KML and GeoJSON can only be written,
//! although GeoJSON geometries can be converted into [`Geom`](crate::Geom) with `TryFrom` (feature
//! `geojson`).
//!
//! Formats that cannot represent circular arcs get the segmentized version of the geometry. The tolerance
//! of the segmentation and the number of decimal digits in text output are taken from
//! [`ExportOptions`](crate::ExportOptions).

mod format;
mod gml;
mod kml;
mod wkb;
mod wkt;
mod xml;

#[cfg(feature = "geojson")]
mod geojson;

pub use gml::GmlVersion;

/// Decoders refuse geometries nested deeper than this.
const MAX_NESTING_DEPTH: usize = 64;
