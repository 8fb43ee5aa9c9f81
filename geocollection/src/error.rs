//! Error type used by the crate.

use thiserror::Error;

use crate::wkb_type::WkbType;

/// Error enum.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// Binary input ended before the geometry was fully read.
    #[error("unexpected end of WKB input at byte {0}")]
    UnexpectedEof(usize),

    /// Binary input has a byte order marker other than 0 or 1.
    #[error("invalid WKB byte order marker: {0}")]
    InvalidByteOrder(u8),

    /// Binary input declares a geometry type code that is not supported.
    #[error("unknown WKB geometry type code: {0}")]
    UnknownWkbType(u32),

    /// Binary input is readable but does not describe a valid geometry.
    #[error("invalid WKB at byte {position}: {message}")]
    Wkb {
        /// Byte offset of the geometry where the problem was found.
        position: usize,
        /// Description of the problem.
        message: String,
    },

    /// Input decodes to a geometry of a different type than required.
    #[error("expected {expected} geometry, found {found}")]
    UnexpectedType {
        /// Type the caller asked for.
        expected: WkbType,
        /// Type found in the input.
        found: WkbType,
    },

    /// Text input could not be parsed as WKT.
    #[error("invalid WKT at position {position}: {message}")]
    Wkt {
        /// Byte offset in the input where the problem was found.
        position: usize,
        /// Description of the problem.
        message: String,
    },

    /// Failed to produce XML output.
    #[error("XML write error: {0}")]
    Xml(String),

    /// Projection could not be applied to a vertex.
    #[error("failed to transform vertex {0}")]
    Transform(usize),

    /// Geometry conversion error.
    #[error("invalid input geometry: {0}")]
    Conversion(String),

    /// IO error while writing binary output.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl GeometryError {
    pub(crate) fn wkb(position: usize, message: impl Into<String>) -> Self {
        Self::Wkb {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn wkt(position: usize, message: impl Into<String>) -> Self {
        Self::Wkt {
            position,
            message: message.into(),
        }
    }
}
