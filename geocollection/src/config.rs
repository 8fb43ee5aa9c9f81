//! Options that control segmentation of curves and the output of the codecs.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// How the tolerance of curve segmentation is interpreted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToleranceKind {
    /// Maximum angle in radians between two consecutive vertices, as seen from the arc center.
    #[default]
    MaximumAngle,
    /// Maximum distance between the arc and the chord replacing it.
    MaximumDifference,
}

/// Tolerance used when curves are replaced by line strings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentationTolerance {
    /// Tolerance value.
    pub tolerance: f64,
    /// Meaning of the value.
    pub kind: ToleranceKind,
}

impl SegmentationTolerance {
    /// Maximum angle between vertices in radians.
    pub fn max_angle(tolerance: f64) -> Self {
        Self {
            tolerance,
            kind: ToleranceKind::MaximumAngle,
        }
    }

    /// Maximum distance between arc and chord.
    pub fn max_difference(tolerance: f64) -> Self {
        Self {
            tolerance,
            kind: ToleranceKind::MaximumDifference,
        }
    }
}

impl Default for SegmentationTolerance {
    fn default() -> Self {
        Self::max_angle(PI / 180.0)
    }
}

/// Variant of the WKB type codes produced by the writer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WkbFlavor {
    /// ISO SQL/MM codes (`1000`, `2000`, `3000` offsets for Z, M and ZM).
    #[default]
    Iso,
    /// PostGIS extended codes with Z and M flags in the high bits.
    Extended,
}

/// Options shared by the exporters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Number of decimal digits in text output. `None` writes the shortest exact representation.
    pub precision: Option<usize>,
    /// Type code variant for binary output.
    pub wkb_flavor: WkbFlavor,
    /// Tolerance used by formats that cannot represent curves.
    pub segmentation: SegmentationTolerance,
}

impl ExportOptions {
    /// Options with the given text precision.
    pub fn with_precision(precision: usize) -> Self {
        Self {
            precision: Some(precision),
            ..Default::default()
        }
    }
}
