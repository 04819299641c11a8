// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt::Write as _;

use cartostory_legend::{BarFill, Legend, LegendBody, css_color};
use peniko::Color;

use crate::frame::{Frame, LabelOverlay, RegionSink, RegionVisual};

const LEGEND_ORIGIN: (f64, f64) = (8.0, 8.0);
const SWATCH_SIZE: f64 = 14.0;
const SWATCH_GAP: f64 = 4.0;
const BAR_WIDTH: f64 = 16.0;
const TEXT_OFFSET: f64 = 22.0;

/// Renders frames as standalone SVG documents.
///
/// Regions become `<path>` elements carrying their tooltip and label text as
/// data attributes, labels become `<foreignObject>` boxes and the legend is a
/// group in the top-left corner.
#[derive(Debug, Default)]
pub struct SvgSink {
    out: String,
    tooltip_id: Option<String>,
    label_id: String,
}

impl SvgSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws `frame` and returns the document.
    #[must_use]
    pub fn render(frame: &Frame) -> String {
        let mut sink = Self::new();
        frame.draw(&mut sink);
        sink.finish()
    }

    /// Returns the document written so far.
    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }

    fn legend_body(&mut self, body: &LegendBody) {
        let (x, y) = (LEGEND_ORIGIN.0, LEGEND_ORIGIN.1 + SWATCH_SIZE + SWATCH_GAP);
        match body {
            LegendBody::Discrete(swatches) => {
                for (i, swatch) in swatches.iter().enumerate() {
                    let row = y + i as f64 * (SWATCH_SIZE + SWATCH_GAP);
                    let _ = write!(
                        self.out,
                        "<rect class=\"legend-color\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{}/>",
                        fmt_f64(x),
                        fmt_f64(row),
                        fmt_f64(SWATCH_SIZE),
                        fmt_f64(SWATCH_SIZE),
                        fill_attrs(swatch.color),
                    );
                    let _ = write!(
                        self.out,
                        "<text x=\"{}\" y=\"{}\">{}</text>",
                        fmt_f64(x + TEXT_OFFSET),
                        fmt_f64(row + SWATCH_SIZE - 2.0),
                        escape(&swatch.label),
                    );
                }
            }
            LegendBody::Continuous(bar) => {
                let top = y + SWATCH_SIZE;
                let fill = match &bar.fill {
                    BarFill::Solid(color) => fill_attrs(*color),
                    BarFill::Gradient(stops) => {
                        let id = format!("{}-gradient", self.label_id);
                        let _ = write!(
                            self.out,
                            "<defs><linearGradient id=\"{id}\" x1=\"0\" y1=\"1\" x2=\"0\" y2=\"0\">"
                        );
                        for stop in stops {
                            let _ = write!(
                                self.out,
                                "<stop offset=\"{}%\" stop-color=\"{}\"/>",
                                fmt_f64(stop.percent),
                                css_color(stop.color),
                            );
                        }
                        self.out.push_str("</linearGradient></defs>");
                        format!(" fill=\"url(#{id})\"")
                    }
                };
                self.end_label(x, y, &bar.top_label, bar.max_value_label.as_deref());
                let _ = write!(
                    self.out,
                    "<rect class=\"legend-gradient\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{fill} data-background=\"{}\"/>",
                    fmt_f64(x),
                    fmt_f64(top),
                    fmt_f64(BAR_WIDTH),
                    fmt_f64(bar.height),
                    escape(&bar.fill.to_css()),
                );
                let bottom = top + bar.height + SWATCH_SIZE;
                self.end_label(x, bottom, &bar.bottom_label, bar.min_value_label.as_deref());
            }
        }
    }

    fn end_label(&mut self, x: f64, y: f64, value: &str, caption: Option<&str>) {
        let text = match caption {
            Some(caption) => format!("{caption} {value}"),
            None => value.to_owned(),
        };
        let _ = write!(
            self.out,
            "<text class=\"legend-gradient-label\" x=\"{}\" y=\"{}\">{}</text>",
            fmt_f64(x),
            fmt_f64(y),
            escape(&text),
        );
    }
}

impl RegionSink for SvgSink {
    fn begin(&mut self, frame: &Frame) {
        let (w, h) = (fmt_f64(frame.viewport.width), fmt_f64(frame.viewport.height));
        let _ = write!(
            self.out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">"
        );
        self.tooltip_id = frame.tooltip.as_ref().map(|tooltip| tooltip.id.clone());
        self.label_id.clone_from(&frame.label_id);
    }

    fn region(&mut self, region: &RegionVisual) {
        let class = if region.is_selected() {
            "cartostory-heatmap__region selected"
        } else {
            "cartostory-heatmap__region"
        };
        let _ = write!(
            self.out,
            "<path id=\"{}\" class=\"{class}\" d=\"{}\"{}",
            escape(&region.key),
            region.path.to_svg(),
            fill_attrs(region.fill),
        );
        if let Some(tooltip_id) = &self.tooltip_id {
            let _ = write!(
                self.out,
                " data-tooltip-id=\"{}\" data-tooltip-html=\"{}\"",
                escape(tooltip_id),
                escape(&region.tooltip),
            );
        }
        let _ = write!(
            self.out,
            " data-region-label-id=\"{}\" data-region-label-html=\"{}\"/>",
            escape(&self.label_id),
            escape(&region.label),
        );
    }

    fn label(&mut self, label: &LabelOverlay) {
        let rect = label.rect;
        let _ = write!(
            self.out,
            "<foreignObject x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"><div xmlns=\"http://www.w3.org/1999/xhtml\" class=\"cartostory-heatmap__region-label\">{}</div></foreignObject>",
            fmt_f64(rect.x0),
            fmt_f64(rect.y0),
            fmt_f64(rect.width()),
            fmt_f64(rect.height()),
            escape(&label.content),
        );
    }

    fn legend(&mut self, legend: &Legend) {
        let _ = write!(
            self.out,
            "<g class=\"cartostory-heatmap__legend\"><text class=\"legend-header\" x=\"{}\" y=\"{}\">{}</text>",
            fmt_f64(LEGEND_ORIGIN.0),
            fmt_f64(LEGEND_ORIGIN.1 + SWATCH_SIZE - 2.0),
            escape(&legend.title),
        );
        self.legend_body(&legend.body);
        self.out.push_str("</g>");
    }

    fn end(&mut self) {
        self.out.push_str("</svg>");
    }
}

fn fill_attrs(color: Color) -> String {
    let rgba = color.to_rgba8();
    let hex = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
    if rgba.a == u8::MAX {
        format!(" fill=\"{hex}\"")
    } else {
        let a = f64::from(rgba.a) / 255.0;
        format!(" fill=\"{hex}\" fill-opacity=\"{}\"", fmt_f64(a))
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn fmt_f64(v: f64) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }
    if v.fract() == 0.0 && v.abs() < 1e15 {
        return format!("{v:.0}");
    }
    let mut s = format!("{v:.3}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if s == "-0" { "0".into() } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_compact() {
        assert_eq!(fmt_f64(600.0), "600");
        assert_eq!(fmt_f64(-47.5), "-47.5");
        assert_eq!(fmt_f64(0.123_456), "0.123");
        assert_eq!(fmt_f64(-0.000_1), "0");
    }

    #[test]
    fn markup_is_escaped() {
        assert_eq!(escape("<b>\"R&D\"</b>"), "&lt;b&gt;&quot;R&amp;D&quot;&lt;/b&gt;");
    }

    #[test]
    fn translucent_fills_carry_opacity() {
        assert_eq!(fill_attrs(Color::from_rgba8(255, 0, 0, 255)), " fill=\"#ff0000\"");
        assert_eq!(
            fill_attrs(Color::from_rgba8(0, 0, 0, 51)),
            " fill=\"#000000\" fill-opacity=\"0.2\""
        );
    }
}
