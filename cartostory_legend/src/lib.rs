// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=cartostory_legend --heading-base-level=0

//! Cartostory Legend: color scales and the legends that explain them.
//!
//! This crate provides:
//! - [`ColorScale`], a piecewise-linear map from numbers to colors over a
//!   [`Domain`] of breakpoints.
//! - [`LegendSpec`], which turns a domain, a step and a [`ScaleKind`] into a
//!   [`Legend`]: either discrete [`Swatch`]es or a continuous [`GradientBar`].
//! - [`format_value`], the default label format (grouped thousands, up to two
//!   fraction digits), and [`Formatter`] for custom ones.
//!
//! Colors are [`peniko::Color`]s. Gradient bars can be emitted as a CSS
//! `linear-gradient` string or as a [`peniko::Brush`] for a renderer.
//!
//! ## Discrete legend
//!
//! ```rust
//! use cartostory_legend::{ColorScale, DEFAULT_COLOR_RANGE, LegendBody, LegendSpec};
//!
//! let scale = ColorScale::from_css([0.0, 20.0], DEFAULT_COLOR_RANGE).unwrap();
//! let spec = LegendSpec {
//!     domain: [0.0, 20.0].into_iter().collect(),
//!     ..LegendSpec::default()
//! };
//! let legend = spec.build(|v| scale.color(v));
//!
//! let LegendBody::Discrete(swatches) = legend.body else { unreachable!() };
//! let labels: Vec<_> = swatches.iter().map(|s| s.label.as_str()).collect();
//! assert_eq!(labels, ["0", "5", "10", "15", "20"]);
//! ```
//!
//! ## Continuous legend
//!
//! ```rust
//! use cartostory_legend::{BarFill, ColorScale, DEFAULT_COLOR_RANGE, LegendBody, LegendSpec, ScaleKind};
//!
//! let scale = ColorScale::from_css([10.0, 30.0], DEFAULT_COLOR_RANGE).unwrap();
//! let spec = LegendSpec {
//!     domain: [10.0, 20.0, 30.0].into_iter().collect(),
//!     kind: ScaleKind::Continuous,
//!     ..LegendSpec::default()
//! };
//! let LegendBody::Continuous(bar) = spec.build(|v| scale.color(v)).body else { unreachable!() };
//! let BarFill::Gradient(stops) = &bar.fill else { unreachable!() };
//! assert_eq!(stops.iter().map(|s| s.percent).collect::<Vec<_>>(), [0.0, 50.0, 100.0]);
//! ```

mod format;
mod legend;
mod scale;

pub use format::{Formatter, format_value};
pub use legend::{
    BarFill, DEFAULT_BAR_HEIGHT, DEFAULT_STEP, DEFAULT_TITLE, GradientBar, GradientStop, Legend,
    LegendBody, LegendSpec, MAX_SWATCHES, ScaleKind, Swatch,
};
pub use scale::{
    ColorScale, DEFAULT_COLOR_RANGE, Domain, ScaleError, css_color, parse_css_color,
};
