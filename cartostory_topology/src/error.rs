// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// Error returned when a topology cannot be parsed or converted to features.
///
/// These are structural problems with the input. Missing ids or data entries
/// are not errors; see [`Violation`](crate::Violation).
#[derive(Debug)]
pub enum TopologyError {
    /// The TopoJSON text could not be decoded.
    Json(serde_json::Error),
    /// The topology declares no objects.
    NoObjects,
    /// The requested object name does not exist.
    MissingObject(String),
    /// A geometry references an arc that does not exist.
    ArcOutOfRange {
        /// The arc reference as written in the geometry.
        index: i64,
        /// Number of arcs in the topology.
        arcs: usize,
    },
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid TopoJSON: {err}"),
            Self::NoObjects => f.write_str("topology has no objects"),
            Self::MissingObject(name) => write!(f, "topology has no object named \"{name}\""),
            Self::ArcOutOfRange { index, arcs } => write!(
                f,
                "arc reference {index} is out of range for a topology with {arcs} arcs"
            ),
        }
    }
}

impl core::error::Error for TopologyError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TopologyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
