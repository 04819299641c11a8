// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=cartostory_projection --heading-base-level=0

//! Cartostory Projection: from longitude/latitude to view pixels.
//!
//! This crate provides:
//! - [`Mercator`], a spherical Mercator projection with the usual scale,
//!   translate and center parameters and a [`fit_size`](Mercator::fit_size)
//!   helper that frames a set of features inside a viewport.
//! - [`ProjectionSettings`], the caller-facing knobs of a map (fit, scale
//!   multiplier, center offset) and the order they are applied in.
//! - [`project_geometry`], which turns a [`FeatureGeometry`] into a
//!   [`kurbo::BezPath`] in view space.
//! - [`center_rect`], which places a fixed-size overlay box so that its center
//!   lands on a projected point.
//!
//! ## Minimal example
//!
//! ```rust
//! use cartostory_projection::{ProjectionSettings, center_rect};
//! use cartostory_topology::{Feature, FeatureGeometry, Record};
//! use kurbo::{Point, Size};
//!
//! let square = Feature {
//!     id: None,
//!     properties: Record::new(),
//!     geometry: FeatureGeometry::Polygon(vec![vec![
//!         Point::new(0.0, 0.0),
//!         Point::new(10.0, 0.0),
//!         Point::new(10.0, 10.0),
//!         Point::new(0.0, 10.0),
//!         Point::new(0.0, 0.0),
//!     ]]),
//! };
//!
//! let viewport = Size::new(600.0, 600.0);
//! let projection = ProjectionSettings::default().build(viewport, &[square]);
//!
//! // The fitted projection keeps the square inside the viewport.
//! let corner = projection.project(Point::new(10.0, 10.0));
//! assert!(corner.x <= 600.0 + 1e-9 && corner.y >= -1e-9);
//!
//! // A 50x20 label centered on (100, 100) starts at (75, 90).
//! assert_eq!(center_rect(Point::new(100.0, 100.0), Size::new(50.0, 20.0)), Point::new(75.0, 90.0));
//! ```
//!
//! Projection math mirrors the conventions of d3-geo's `geoMercator`, without
//! rotation, resampling or antimeridian clipping.

mod mercator;
mod overlay;
mod path;
mod settings;

pub use mercator::{MAX_LATITUDE, Mercator};
pub use overlay::center_rect;
pub use path::{POINT_RADIUS, project_geometry};
pub use settings::ProjectionSettings;
