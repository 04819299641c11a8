// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;
use peniko::{
    Brush, Color, ColorStop, Extend, Gradient, GradientKind, LinearGradientPosition,
};
use smallvec::smallvec;

use crate::{Domain, Formatter, css_color, format_value};

/// Default legend title.
pub const DEFAULT_TITLE: &str = "Legend";

/// Default spacing between discrete legend values.
pub const DEFAULT_STEP: f64 = 5.0;

/// Most values a discrete legend shows.
pub const MAX_SWATCHES: usize = 100;

/// Default height, in pixels, of a continuous legend bar.
pub const DEFAULT_BAR_HEIGHT: f64 = 200.0;

/// How a legend presents its color scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScaleKind {
    /// One swatch per stepped value.
    #[default]
    Discrete,
    /// A gradient bar through the domain breakpoints.
    Continuous,
}

/// Inputs of a legend.
#[derive(Clone, Debug)]
pub struct LegendSpec {
    /// Heading shown above the legend.
    pub title: String,
    /// Breakpoints, ascending; the first is the minimum and the last the maximum.
    pub domain: Domain,
    /// Spacing between discrete values.
    pub step: f64,
    /// Discrete swatches or a continuous bar.
    pub kind: ScaleKind,
    /// Label formatter; [`format_value`] when absent.
    pub formatter: Option<Formatter>,
    /// Caption shown next to the minimum of a continuous bar.
    pub min_value_label: Option<String>,
    /// Caption shown next to the maximum of a continuous bar.
    pub max_value_label: Option<String>,
    /// Height of a continuous bar, in pixels.
    pub height: f64,
}

impl Default for LegendSpec {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.into(),
            domain: smallvec![0.0, 0.0],
            step: DEFAULT_STEP,
            kind: ScaleKind::Discrete,
            formatter: None,
            min_value_label: None,
            max_value_label: None,
            height: DEFAULT_BAR_HEIGHT,
        }
    }
}

/// One entry of a discrete legend.
#[derive(Clone, Debug, PartialEq)]
pub struct Swatch {
    /// The value this swatch stands for.
    pub value: f64,
    /// Its color.
    pub color: Color,
    /// Its formatted label.
    pub label: String,
}

/// A stop along a continuous legend bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Distance from the bottom of the bar, from 0 to 100.
    pub percent: f64,
    /// Color at this stop.
    pub color: Color,
}

/// The fill of a continuous legend bar.
#[derive(Clone, Debug, PartialEq)]
pub enum BarFill {
    /// A single color, used when the domain has no extent.
    Solid(Color),
    /// A bottom-to-top gradient.
    Gradient(Vec<GradientStop>),
}

impl BarFill {
    /// Formats the fill as a CSS `background` value.
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Solid(color) => css_color(*color),
            Self::Gradient(stops) => {
                let stops: Vec<String> = stops
                    .iter()
                    .map(|stop| format!("{} {}%", css_color(stop.color), stop.percent))
                    .collect();
                format!("linear-gradient(to top, {})", stops.join(", "))
            }
        }
    }

    /// Converts the fill into a brush whose gradient runs from `bottom` to `top`.
    #[must_use]
    pub fn to_brush(&self, bottom: Point, top: Point) -> Brush {
        match self {
            Self::Solid(color) => Brush::Solid(*color),
            Self::Gradient(stops) => {
                let stops: Vec<ColorStop> = stops
                    .iter()
                    .map(|stop| {
                        #[allow(
                            clippy::cast_possible_truncation,
                            reason = "gradient offsets are f32"
                        )]
                        let offset = (stop.percent / 100.0) as f32;
                        ColorStop::from((offset, stop.color))
                    })
                    .collect();
                Brush::Gradient(Gradient {
                    kind: GradientKind::Linear(LinearGradientPosition::new(bottom, top)),
                    extend: Extend::Pad,
                    stops: stops.as_slice().into(),
                    ..Gradient::default()
                })
            }
        }
    }
}

/// A continuous legend bar with its end labels.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientBar {
    /// The bar's fill.
    pub fill: BarFill,
    /// Formatted top value, shown at the top.
    ///
    /// This is the last discrete value (`min + n * step`), which falls below
    /// the domain maximum when the step does not divide the range.
    pub top_label: String,
    /// Formatted minimum, shown at the bottom.
    pub bottom_label: String,
    /// Optional caption for the maximum.
    pub max_value_label: Option<String>,
    /// Optional caption for the minimum.
    pub min_value_label: Option<String>,
    /// Bar height in pixels.
    pub height: f64,
}

/// The body of a built legend.
#[derive(Clone, Debug, PartialEq)]
pub enum LegendBody {
    /// Swatches from the minimum upward.
    Discrete(Vec<Swatch>),
    /// A gradient bar.
    Continuous(GradientBar),
}

/// A legend ready for display.
#[derive(Clone, Debug, PartialEq)]
pub struct Legend {
    /// Heading.
    pub title: String,
    /// Swatches or bar.
    pub body: LegendBody,
}

impl LegendSpec {
    /// Builds the legend, coloring values with `color`.
    ///
    /// An empty domain is treated as `[0]`.
    #[must_use]
    pub fn build(&self, color: impl Fn(f64) -> Color) -> Legend {
        let body = match self.kind {
            ScaleKind::Discrete => LegendBody::Discrete(
                self.values()
                    .map(|value| Swatch {
                        value,
                        color: color(value),
                        label: self.label(value),
                    })
                    .collect(),
            ),
            ScaleKind::Continuous => LegendBody::Continuous(GradientBar {
                fill: self.fill(&color),
                top_label: self.label(self.values().last().unwrap_or_else(|| self.max())),
                bottom_label: self.label(self.min()),
                max_value_label: self.max_value_label.clone(),
                min_value_label: self.min_value_label.clone(),
                height: self.height,
            }),
        };
        Legend {
            title: self.title.clone(),
            body,
        }
    }

    /// Returns the discrete legend values: `min, min + step, …` for
    /// `floor((max - min) / step) + 1` values.
    ///
    /// A step that is not a positive finite number yields `min` alone, and a
    /// maximum below the minimum yields nothing. When the step would produce
    /// more than [`MAX_SWATCHES`] values it is widened by a whole factor until
    /// the count fits.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        let min = self.min();
        let (step, count) = self.stepping();
        (0..count).map(move |i| min + i as f64 * step)
    }

    /// The effective step and the number of discrete values.
    fn stepping(&self) -> (f64, usize) {
        let (min, max) = (self.min(), self.max());
        if !(self.step.is_finite() && self.step > 0.0) {
            return (0.0, 1);
        }
        let steps = ((max - min) / self.step).floor() + 1.0;
        if !(steps.is_finite() && steps > 0.0) {
            return (self.step, 0);
        }
        let limit = MAX_SWATCHES as f64;
        let step = if steps > limit {
            let widened = self.step * (steps / limit).ceil();
            log::warn!(
                "legend step {} gives {steps} values over [{min}, {max}]; using step {widened}",
                self.step
            );
            widened
        } else {
            self.step
        };
        let steps = ((max - min) / step).floor() + 1.0;
        #[allow(
            clippy::cast_possible_truncation,
            reason = "step count is a whole number no larger than MAX_SWATCHES + 1"
        )]
        let count = (steps as usize).min(MAX_SWATCHES);
        (step, count)
    }

    fn min(&self) -> f64 {
        self.domain.first().copied().unwrap_or(0.0)
    }

    fn max(&self) -> f64 {
        self.domain.last().copied().unwrap_or(0.0)
    }

    fn label(&self, value: f64) -> String {
        match &self.formatter {
            Some(formatter) => formatter.format(value),
            None => format_value(value),
        }
    }

    fn fill(&self, color: &impl Fn(f64) -> Color) -> BarFill {
        let (min, max) = (self.min(), self.max());
        let range = max - min;
        if self.domain.len() < 2 || range == 0.0 || !range.is_finite() {
            return BarFill::Solid(color(min));
        }
        BarFill::Gradient(
            self.domain
                .iter()
                .map(|&value| GradientStop {
                    percent: (value - min) / range * 100.0,
                    color: color(value),
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColorScale, DEFAULT_COLOR_RANGE};

    fn spec(domain: &[f64], step: f64, kind: ScaleKind) -> LegendSpec {
        LegendSpec {
            domain: domain.iter().copied().collect(),
            step,
            kind,
            ..LegendSpec::default()
        }
    }

    fn scale(domain: &[f64]) -> ColorScale {
        ColorScale::from_css(domain.iter().copied(), DEFAULT_COLOR_RANGE).unwrap()
    }

    #[test]
    fn discrete_values_are_stepped_and_inclusive() {
        let s = spec(&[0.0, 20.0], 5.0, ScaleKind::Discrete);
        assert_eq!(s.values().collect::<Vec<_>>(), [0.0, 5.0, 10.0, 15.0, 20.0]);

        let s = spec(&[0.0, 1.0], 5.0, ScaleKind::Discrete);
        assert_eq!(s.values().collect::<Vec<_>>(), [0.0]);

        let s = spec(&[0.0, 22.0], 5.0, ScaleKind::Discrete);
        assert_eq!(s.values().count(), 5);
    }

    #[test]
    fn discrete_edge_steps() {
        assert_eq!(spec(&[3.0, 20.0], 0.0, ScaleKind::Discrete).values().collect::<Vec<_>>(), [3.0]);
        assert_eq!(spec(&[3.0, 20.0], -1.0, ScaleKind::Discrete).values().count(), 1);
        assert_eq!(spec(&[20.0, 3.0], 5.0, ScaleKind::Discrete).values().count(), 0);
    }

    #[test]
    fn huge_ranges_widen_the_step() {
        let s = spec(&[0.0, 1e20], 5.0, ScaleKind::Discrete);
        let values: Vec<f64> = s.values().collect();
        assert_eq!(values.len(), MAX_SWATCHES);
        assert_eq!(values[0], 0.0);
        let step = values[1] - values[0];
        assert!(step > 5.0, "step was not widened: {step}");
        assert!(values.windows(2).all(|w| w[1] - w[0] == step));
        assert!(values[MAX_SWATCHES - 1] <= 1e20);

        let s = spec(&[0.0, 1e7], 5.0, ScaleKind::Discrete);
        assert!(s.values().count() <= MAX_SWATCHES);

        // Exactly at the limit the step is kept.
        let s = spec(&[0.0, 99.0], 1.0, ScaleKind::Discrete);
        assert_eq!(s.values().count(), MAX_SWATCHES);
        assert_eq!(s.values().last(), Some(99.0));
    }

    #[test]
    fn huge_ranges_build_a_bounded_legend() {
        let legend = spec(&[0.0, 1e20], DEFAULT_STEP, ScaleKind::Discrete).build(|_| Color::BLACK);
        let LegendBody::Discrete(swatches) = legend.body else {
            panic!("expected swatches");
        };
        assert_eq!(swatches.len(), MAX_SWATCHES);
        assert_eq!(swatches[0].label, "0");
    }

    #[test]
    fn discrete_swatches_carry_colors_and_labels() {
        let scale = scale(&[0.0, 20.0]);
        let legend = spec(&[0.0, 20.0], 5.0, ScaleKind::Discrete).build(|v| scale.color(v));
        assert_eq!(legend.title, "Legend");
        let LegendBody::Discrete(swatches) = legend.body else {
            panic!("expected swatches");
        };
        assert_eq!(swatches.len(), 5);
        assert_eq!(swatches[1].label, "5");
        assert_eq!(css_color(swatches[0].color), "#90caff");
        assert_eq!(css_color(swatches[4].color), "#2998ff");
    }

    #[test]
    fn continuous_stops_follow_the_domain() {
        let scale = scale(&[10.0, 20.0, 30.0]);
        let legend = spec(&[10.0, 20.0, 30.0], 5.0, ScaleKind::Continuous).build(|v| scale.color(v));
        let LegendBody::Continuous(bar) = legend.body else {
            panic!("expected a bar");
        };
        let BarFill::Gradient(stops) = &bar.fill else {
            panic!("expected a gradient");
        };
        let percents: Vec<f64> = stops.iter().map(|s| s.percent).collect();
        assert_eq!(percents, [0.0, 50.0, 100.0]);
        assert_eq!(bar.top_label, "30");
        assert_eq!(bar.bottom_label, "10");
        assert_eq!(bar.height, DEFAULT_BAR_HEIGHT);
        assert!(bar.fill.to_css().starts_with("linear-gradient(to top, #90caff 0%, "));
        assert!(bar.fill.to_css().ends_with(" 100%)"));
    }

    #[test]
    fn continuous_top_label_is_the_last_stepped_value() {
        let legend = spec(&[0.0, 22.0], 5.0, ScaleKind::Continuous).build(|_| Color::BLACK);
        let LegendBody::Continuous(bar) = legend.body else {
            panic!("expected a bar");
        };
        assert_eq!(bar.top_label, "20");
        assert_eq!(bar.bottom_label, "0");
    }

    #[test]
    fn single_or_flat_domains_are_solid() {
        let scale = scale(&[5.0]);
        for domain in [&[5.0][..], &[5.0, 5.0][..]] {
            let legend = spec(domain, 5.0, ScaleKind::Continuous).build(|v| scale.color(v));
            let LegendBody::Continuous(bar) = legend.body else {
                panic!("expected a bar");
            };
            assert_eq!(bar.fill, BarFill::Solid(scale.color(5.0)));
            assert_eq!(bar.fill.to_css(), "#90caff");
        }
    }

    #[test]
    fn formatter_and_captions_are_used() {
        let s = LegendSpec {
            formatter: Some(Formatter::new(|v| format!("{v} t"))),
            min_value_label: Some("low".into()),
            max_value_label: Some("high".into()),
            ..spec(&[0.0, 100.0], 50.0, ScaleKind::Continuous)
        };
        let LegendBody::Continuous(bar) = s.build(|_| Color::BLACK).body else {
            panic!("expected a bar");
        };
        assert_eq!(bar.top_label, "100 t");
        assert_eq!(bar.min_value_label.as_deref(), Some("low"));
        assert_eq!(bar.max_value_label.as_deref(), Some("high"));
    }

    #[test]
    fn gradient_brush_has_one_stop_per_breakpoint() {
        let fill = BarFill::Gradient(vec![
            GradientStop { percent: 0.0, color: Color::WHITE },
            GradientStop { percent: 100.0, color: Color::BLACK },
        ]);
        let Brush::Gradient(gradient) = fill.to_brush(Point::new(0.0, 200.0), Point::ORIGIN) else {
            panic!("expected a gradient brush");
        };
        assert_eq!(gradient.stops.len(), 2);
        assert_eq!(gradient.stops[1].offset, 1.0);
        assert!(matches!(BarFill::Solid(Color::WHITE).to_brush(Point::ORIGIN, Point::ORIGIN), Brush::Solid(_)));
    }
}
