// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use cartostory_legend::{Domain, ScaleError, parse_css_color};
use cartostory_projection::ProjectionSettings;
use kurbo::{Size, Vec2};
use peniko::Color;
use serde::Deserialize;

/// Width and height of the map viewport, in pixels.
pub const DEFAULT_VIEWPORT: Size = Size::new(600.0, 600.0);

/// Heatmap configuration with every default applied.
#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapConfig {
    /// Dotted path locating each geometry's id.
    ///
    /// Default: `"id"`.
    pub id_path: String,
    /// Field holding the numeric value in record-style datasets.
    ///
    /// Default: none, for datasets of plain numbers.
    pub value_key: Option<String>,
    /// Colors of the scale, matched to the domain breakpoints.
    ///
    /// Default: `#90caff` to `#2998ff`.
    pub color_range: Vec<Color>,
    /// Domain breakpoints of the scale.
    ///
    /// Default: none, meaning `[0, max]` over the dataset values.
    pub domain: Option<Domain>,
    /// Projection fit, scale and translate.
    pub projection: ProjectionSettings,
    /// Map viewport size.
    ///
    /// Default: 600 × 600.
    pub viewport: Size,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            id_path: "id".into(),
            value_key: None,
            color_range: vec![
                Color::from_rgb8(0x90, 0xca, 0xff),
                Color::from_rgb8(0x29, 0x98, 0xff),
            ],
            domain: None,
            projection: ProjectionSettings::default(),
            viewport: DEFAULT_VIEWPORT,
        }
    }
}

impl HeatmapConfig {
    /// Checks that the color scale can be built from this configuration.
    pub fn validate(&self) -> Result<(), ScaleError> {
        if self.color_range.is_empty() {
            return Err(ScaleError::EmptyRange);
        }
        if self.domain.as_ref().is_some_and(|domain| domain.is_empty()) {
            return Err(ScaleError::EmptyDomain);
        }
        Ok(())
    }
}

/// Serialized heatmap options, as found in JSON configuration.
///
/// Every field is optional; missing fields take the [`HeatmapConfig`]
/// defaults. Keys are camelCase:
///
/// ```json
/// { "idPath": "properties.iso", "valueKey": "population",
///   "colorRange": ["#fff", "crimson"], "domain": [0, 100],
///   "scale": 1.5, "translate": [2, -1], "fitSize": true }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HeatmapOptions {
    /// See [`HeatmapConfig::id_path`].
    pub id_path: Option<String>,
    /// See [`HeatmapConfig::value_key`].
    pub value_key: Option<String>,
    /// CSS color strings; see [`HeatmapConfig::color_range`].
    pub color_range: Option<Vec<String>>,
    /// See [`HeatmapConfig::domain`].
    pub domain: Option<Vec<f64>>,
    /// Projection scale multiplier.
    pub scale: Option<f64>,
    /// Projection center offset in degrees.
    pub translate: Option<[f64; 2]>,
    /// Whether to fit the map to the viewport.
    pub fit_size: Option<bool>,
}

impl HeatmapOptions {
    /// Parses options from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl TryFrom<HeatmapOptions> for HeatmapConfig {
    type Error = ScaleError;

    fn try_from(options: HeatmapOptions) -> Result<Self, Self::Error> {
        let defaults = Self::default();
        let color_range = match options.color_range {
            Some(colors) => colors
                .iter()
                .map(|color| parse_css_color(color))
                .collect::<Result<Vec<_>, _>>()?,
            None => defaults.color_range,
        };
        let projection = ProjectionSettings {
            fit_size: options.fit_size.unwrap_or(defaults.projection.fit_size),
            scale: options.scale.unwrap_or(defaults.projection.scale),
            translate: options
                .translate
                .map_or(defaults.projection.translate, |[x, y]| Vec2::new(x, y)),
        };
        let config = Self {
            id_path: options.id_path.unwrap_or(defaults.id_path),
            value_key: options.value_key,
            color_range,
            domain: options.domain.map(|domain| domain.into_iter().collect()),
            projection,
            viewport: defaults.viewport,
        };
        config.validate()?;
        Ok(config)
    }
}
