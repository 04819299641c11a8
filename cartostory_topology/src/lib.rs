// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=cartostory_topology --heading-base-level=0

//! Cartostory Topology: the input side of a choropleth map.
//!
//! This crate models the two things a region-colored map is built from:
//! - A [`Topology`]: already-decoded TopoJSON with named objects, shared arcs and
//!   an optional quantization transform.
//! - A [`Dataset`]: an ordered mapping from [`RegionId`] to per-region values,
//!   either a direct number or a record of named fields ([`DataEntry`]).
//!
//! On top of the model it provides:
//! - A dotted-path [property accessor](get_property) used to pull a region id out
//!   of a geometry (`"id"`, `"properties.code"`, ...).
//! - Advisory [validation](validate) of ids and dataset coverage. Failures are
//!   logged through the `log` facade and returned as a [`Violation`]; they never
//!   panic and never block rendering.
//! - Conversion of a topology object into planar [`Feature`]s in
//!   longitude/latitude, including centroids for label placement.
//!
//! It does **not** project coordinates or draw anything. See the
//! `cartostory_projection` and `cartostory_heatmap` crates for that.
//!
//! ## Minimal example
//!
//! ```rust
//! use cartostory_topology::{DataEntry, Dataset, Topology, validate};
//!
//! let topology = Topology::from_json(
//!     r#"{
//!         "type": "Topology",
//!         "arcs": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]],
//!         "objects": {
//!             "regions": {
//!                 "type": "GeometryCollection",
//!                 "geometries": [{ "type": "Polygon", "arcs": [[0]], "id": "A" }]
//!             }
//!         }
//!     }"#,
//! )
//! .unwrap();
//!
//! let data: Dataset<DataEntry> = serde_json::from_str(r#"{ "A": { "population": 12 } }"#).unwrap();
//!
//! assert!(validate::validate_geometries_have_id(&topology, "id").is_ok());
//! assert!(validate::validate_data_keys(&topology, &data, "id", Some("population")).is_ok());
//! assert_eq!(data.get("A").map(|entry| entry.value(Some("population"))), Some(12.0));
//! ```

mod dataset;
mod error;
mod feature;
mod model;
mod property;
pub mod validate;

pub use dataset::{DataEntry, Dataset, RegionId};
pub use error::TopologyError;
pub use feature::{Feature, FeatureGeometry, decode_arcs, feature_collection, first_feature_collection};
pub use model::{Geometry, GeometryKind, Objects, Position, Record, Topology, Transform};
pub use property::{PropertySource, get_property, region_id, resolve_path};
pub use validate::Violation;
