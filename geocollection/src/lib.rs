//! Heterogeneous geometry collections with vertex addressing, editing and codecs.
//!
//! The central type is [`GeometryCollection`]: a container of points, curves (including circular arcs),
//! surfaces and nested collections with 2D, Z, M or ZM coordinates. Every vertex of a collection is addressed
//! by a [`VertexId`] (part, ring, vertex), and the collection can be edited through these addresses. Parts
//! that collapse after a vertex removal are dropped from the collection.
//!
//! # Quick start
//!
//! ```
//! use geocollection::{GeometryCollection, LineString, Point, VertexId};
//!
//! let mut collection = GeometryCollection::new();
//! collection.add_geometry(LineString::new(vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(10.0, 0.0),
//!     Point::new(10.0, 10.0),
//! ]));
//! collection.add_geometry(Point::new(5.0, 5.0));
//!
//! assert!(collection.move_vertex(VertexId::new(0, 0, 1), Point::new(10.0, 5.0)));
//! assert_eq!(
//!     collection.to_wkt(),
//!     "GEOMETRYCOLLECTION (LINESTRING (0 0, 10 5, 10 10), POINT (5 5))"
//! );
//!
//! let wkb = collection.to_wkb()?;
//! let mut decoded = GeometryCollection::new();
//! decoded.from_wkb(&wkb)?;
//! assert_eq!(decoded, collection);
//! # Ok::<(), geocollection::GeometryError>(())
//! ```
//!
//! # Main components
//!
//! * [`Geom`] is the closed set of geometries that can be collection parts, and the [`Geometry`] trait is the
//!   per-part contract (counting, editing, measuring and converting vertices) the collection delegates to.
//! * [`VertexCursor`] walks the vertices of a collection in order, [`GeometryCollection::vertices`] does the
//!   same as an iterator.
//! * [`Projection`] is the interface for coordinate transformations applied by
//!   [`GeometryCollection::transform`].
//! * The [`io`] module adds WKB and WKT reading and writing, and GML2, GML3, GeoJSON and KML output.
//!
//! # Features
//!
//! * `geojson` - GeoJSON output and conversion from [`geojson::Geometry`].
//! * `geo-types` - conversions from and to `geo_types` geometries.
//! * `geodesy` - [`GeodesyProjection`](projection::GeodesyProjection) backed by the `geodesy` crate.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

mod arc;
mod collection;
mod config;
mod error;
mod geometry;
pub mod impls;
pub mod io;
mod point;
pub mod projection;
mod rect;
pub mod segment;
mod vertex_id;
mod wkb_type;

#[cfg(feature = "geo-types")]
mod geo_types;

pub use collection::GeometryCollection;
pub use config::{ExportOptions, SegmentationTolerance, ToleranceKind, WkbFlavor};
pub use error::GeometryError;
pub use geometry::{Geom, Geometry};
pub use impls::{CircularString, CompoundCurve, Curve, CurvePolygon, LineString, Polygon, Ring};
pub use io::GmlVersion;
pub use point::Point;
pub use projection::{Projection, TransformDirection};
pub use rect::Rect;
pub use segment::{SegmentHit, Side};
pub use vertex_id::{CursorPosition, VertexCursor, VertexId};
pub use wkb_type::{Dimensions, GeometryKind, WkbType};
