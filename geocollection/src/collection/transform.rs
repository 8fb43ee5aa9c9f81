use nalgebra::{Affine2, Point2};

use crate::collection::GeometryCollection;
use crate::error::GeometryError;
use crate::geometry::Geometry;
use crate::projection::{Projection, TransformDirection};

impl GeometryCollection {
    /// Converts every vertex with the projection.
    ///
    /// Measure values are kept as is. Elevation is kept unless `transform_z` is set, in which case the one
    /// returned by the projection is used.
    ///
    /// Vertices are converted in the order of [`vertices`](Self::vertices). If the projection fails for a vertex,
    /// the preceding vertices stay converted, the failing one and the following stay untouched and
    /// [`GeometryError::Transform`] with the global number of the failing vertex is returned.
    pub fn transform(
        &mut self,
        projection: &dyn Projection,
        direction: TransformDirection,
        transform_z: bool,
    ) -> Result<(), GeometryError> {
        let mut index = 0;
        let converted = self.try_transform_vertices(&mut |point| {
            let mut projected = direction.apply(projection, point)?;
            if !transform_z {
                projected.set_z(point.z());
            }
            projected.set_m(point.m());

            index += 1;
            Some(projected)
        });

        if converted {
            Ok(())
        } else {
            log::warn!("Projection failed for vertex {index} of the geometry collection");
            Err(GeometryError::Transform(index))
        }
    }

    /// Applies the affine transformation to the planar coordinates of every vertex, and linear scale and
    /// offset to elevation and measure:
    ///
    /// ```text
    /// z' = z * z_scale + z_offset
    /// m' = m * m_scale + m_offset
    /// ```
    pub fn transform_affine(
        &mut self,
        affine: &Affine2<f64>,
        z_scale: f64,
        z_offset: f64,
        m_scale: f64,
        m_offset: f64,
    ) {
        self.transform_vertices(&mut |point| {
            let planar = affine.transform_point(&Point2::new(point.x(), point.y()));

            let mut transformed = *point;
            transformed.set_x(planar.x);
            transformed.set_y(planar.y);
            transformed.set_z(point.z().map(|z| z * z_scale + z_offset));
            transformed.set_m(point.m().map(|m| m * m_scale + m_offset));
            transformed
        });
    }
}
