// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use peniko::Color;
use peniko::color::{Srgb, parse_color};
use smallvec::SmallVec;

/// Numeric breakpoints of a color scale, in ascending order.
///
/// Most maps use two or three breakpoints, which stay inline.
pub type Domain = SmallVec<[f64; 4]>;

/// The default color range: a light and a saturated blue.
pub const DEFAULT_COLOR_RANGE: [&str; 2] = ["#90caff", "#2998ff"];

/// Errors produced while building a [`ColorScale`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScaleError {
    /// The domain has no breakpoints.
    EmptyDomain,
    /// The range has no colors.
    EmptyRange,
    /// A color string could not be parsed.
    InvalidColor {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl fmt::Display for ScaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDomain => f.write_str("color scale domain is empty"),
            Self::EmptyRange => f.write_str("color scale range is empty"),
            Self::InvalidColor { input, reason } => {
                write!(f, "invalid color \"{input}\": {reason}")
            }
        }
    }
}

impl core::error::Error for ScaleError {}

/// Parses a CSS color string such as `"#2998ff"`, `"rgb(41 152 255)"` or
/// `"steelblue"` into an sRGB color.
pub fn parse_css_color(input: &str) -> Result<Color, ScaleError> {
    parse_color(input)
        .map(|color| color.to_alpha_color::<Srgb>())
        .map_err(|err| ScaleError::InvalidColor {
            input: input.into(),
            reason: err.to_string(),
        })
}

/// Formats `color` for CSS: `#rrggbb` when opaque, `rgba(..)` otherwise.
#[must_use]
pub fn css_color(color: Color) -> String {
    let rgba = color.to_rgba8();
    if rgba.a == u8::MAX {
        format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
    } else {
        let a = f32::from(rgba.a) / 255.0;
        format!("rgba({}, {}, {}, {a:.3})", rgba.r, rgba.g, rgba.b)
    }
}

/// A piecewise-linear map from numbers to colors.
///
/// Breakpoint `i` of the domain maps to color `i` of the range. Values between
/// breakpoints interpolate the neighboring colors component-wise in sRGB, and
/// values outside the domain extrapolate the nearest segment with the result
/// clamped to valid colors. Extra breakpoints or colors beyond the shorter of
/// the two lists are ignored.
///
/// A single breakpoint (or a single color) maps every value to the first color.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorScale {
    domain: Domain,
    range: Vec<Color>,
}

impl ColorScale {
    /// Creates a scale from breakpoints and colors.
    pub fn new(
        domain: impl IntoIterator<Item = f64>,
        range: impl IntoIterator<Item = Color>,
    ) -> Result<Self, ScaleError> {
        let domain: Domain = domain.into_iter().collect();
        let range: Vec<Color> = range.into_iter().collect();
        if domain.is_empty() {
            return Err(ScaleError::EmptyDomain);
        }
        if range.is_empty() {
            return Err(ScaleError::EmptyRange);
        }
        Ok(Self { domain, range })
    }

    /// Creates a scale whose colors are CSS strings.
    pub fn from_css<S: AsRef<str>>(
        domain: impl IntoIterator<Item = f64>,
        range: impl IntoIterator<Item = S>,
    ) -> Result<Self, ScaleError> {
        let range = range
            .into_iter()
            .map(|s| parse_css_color(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(domain, range)
    }

    /// Returns the breakpoints.
    #[must_use]
    pub fn domain(&self) -> &[f64] {
        &self.domain
    }

    /// Returns the colors.
    #[must_use]
    pub fn range(&self) -> &[Color] {
        &self.range
    }

    /// Maps `value` to a color.
    #[must_use]
    pub fn color(&self, value: f64) -> Color {
        let n = self.domain.len().min(self.range.len());
        if n < 2 {
            return self.range[0];
        }
        let (domain, range) = (&self.domain[..n], &self.range[..n]);
        if domain[n - 1] < domain[0] {
            // Descending breakpoints: walk both lists from the other end.
            let domain: Domain = domain.iter().rev().copied().collect();
            let range: Vec<Color> = range.iter().rev().copied().collect();
            return piecewise(&domain, &range, value);
        }
        piecewise(domain, range, value)
    }
}

fn piecewise(domain: &[f64], range: &[Color], value: f64) -> Color {
    let last = domain.len() - 1;
    let i = domain[1..last].partition_point(|&d| d <= value);
    let (d0, d1) = (domain[i], domain[i + 1]);
    let t = if d1 == d0 { 0.5 } else { (value - d0) / (d1 - d0) };
    lerp(range[i], range[i + 1], t)
}

fn lerp(a: Color, b: Color, t: f64) -> Color {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "color components are f32"
    )]
    let t = t as f32;
    let mut components = [0.0; 4];
    for (out, (a, b)) in components
        .iter_mut()
        .zip(a.components.iter().zip(b.components.iter()))
    {
        *out = (a + (b - a) * t).clamp(0.0, 1.0);
    }
    Color::new(components)
}
