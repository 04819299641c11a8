// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render output: everything a drawing backend needs, and nothing it doesn't.

use cartostory_legend::Legend;
use cartostory_topology::RegionId;
use kurbo::{BezPath, Point, Rect, Size};
use peniko::Color;

use crate::slot::{TooltipPosition, TooltipTrigger};

bitflags::bitflags! {
    /// Per-region presentation state.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RegionState: u8 {
        /// The region is in the selection set.
        const SELECTED = 0b0000_0001;
        /// The dataset has an entry for the region.
        const HAS_DATA = 0b0000_0010;
    }
}

/// One region of the map, projected and colored.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionVisual {
    /// Element key, unique within the page: `geo-{instance}-{region}`.
    pub key: String,
    /// The region's id, when its id path resolves.
    pub id: Option<RegionId>,
    /// Outline in viewport coordinates.
    pub path: BezPath,
    /// Fill color.
    pub fill: Color,
    /// Value the fill was derived from.
    pub value: f64,
    /// Selection and data flags.
    pub state: RegionState,
    /// Tooltip text.
    pub tooltip: String,
    /// Label text, used by label overlays.
    pub label: String,
}

impl RegionVisual {
    /// Returns `true` if the region is selected.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.state.contains(RegionState::SELECTED)
    }
}

/// A fixed-size label box centered on a region.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelOverlay {
    /// Element key: `{instance}_label_{region}`.
    pub key: String,
    /// The labelled region's id.
    pub region: Option<RegionId>,
    /// Box in viewport coordinates.
    pub rect: Rect,
    /// Label text.
    pub content: String,
}

/// Tooltip behavior for the whole map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TooltipSettings {
    /// Tooltip element id: `tooltip-{instance}`.
    pub id: String,
    /// When the tooltip opens.
    pub trigger: TooltipTrigger,
    /// Whether it follows the pointer.
    pub float: bool,
    /// Which side it sits on.
    pub position: TooltipPosition,
}

/// One fully derived render pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Map viewport size.
    pub viewport: Size,
    /// Region label element id: `region-label-{instance}`.
    pub label_id: String,
    /// Regions in drawing order.
    pub regions: Vec<RegionVisual>,
    /// Label overlays, bottom to top.
    pub labels: Vec<LabelOverlay>,
    /// The legend, when one is declared.
    pub legend: Option<Legend>,
    /// Tooltip behavior, when a tooltip is declared.
    pub tooltip: Option<TooltipSettings>,
}

impl Frame {
    /// Returns the topmost region whose outline contains `point`.
    #[must_use]
    pub fn region_at(&self, point: Point) -> Option<&RegionVisual> {
        use kurbo::Shape as _;
        self.regions.iter().rev().find(|region| region.path.contains(point))
    }

    /// Feeds this frame to `sink`: regions, then labels, then the legend.
    pub fn draw(&self, sink: &mut impl RegionSink) {
        log::trace!(
            "drawing {} regions and {} labels",
            self.regions.len(),
            self.labels.len()
        );
        sink.begin(self);
        for region in &self.regions {
            sink.region(region);
        }
        for label in &self.labels {
            sink.label(label);
        }
        if let Some(legend) = &self.legend {
            sink.legend(legend);
        }
        sink.end();
    }
}

/// A drawing backend for frames.
///
/// Only [`region`](Self::region) is required; the other hooks default to
/// doing nothing.
pub trait RegionSink {
    /// Called once before anything else.
    fn begin(&mut self, frame: &Frame) {
        let _ = frame;
    }

    /// Draws one region.
    fn region(&mut self, region: &RegionVisual);

    /// Draws one label overlay.
    fn label(&mut self, label: &LabelOverlay) {
        let _ = label;
    }

    /// Draws the legend.
    fn legend(&mut self, legend: &Legend) {
        let _ = legend;
    }

    /// Called once after everything else.
    fn end(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape;

    fn square(key: &str, x: f64) -> RegionVisual {
        RegionVisual {
            key: key.into(),
            id: Some(key.into()),
            path: Rect::new(x, 0.0, x + 10.0, 10.0).to_path(0.1),
            fill: Color::BLACK,
            value: 0.0,
            state: RegionState::empty(),
            tooltip: key.into(),
            label: key.into(),
        }
    }

    fn frame(regions: Vec<RegionVisual>) -> Frame {
        Frame {
            viewport: Size::new(100.0, 100.0),
            label_id: "region-label-test".into(),
            regions,
            labels: Vec::new(),
            legend: None,
            tooltip: None,
        }
    }

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl RegionSink for Recorder {
        fn begin(&mut self, _: &Frame) {
            self.0.push("begin".into());
        }

        fn region(&mut self, region: &RegionVisual) {
            self.0.push(region.key.clone());
        }

        fn end(&mut self) {
            self.0.push("end".into());
        }
    }

    #[test]
    fn later_regions_win_hit_tests() {
        let frame = frame(vec![square("under", 0.0), square("over", 5.0)]);
        assert_eq!(frame.region_at(Point::new(7.0, 5.0)).map(|r| r.key.as_str()), Some("over"));
        assert_eq!(frame.region_at(Point::new(2.0, 5.0)).map(|r| r.key.as_str()), Some("under"));
        assert!(frame.region_at(Point::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn draw_visits_in_order() {
        let frame = frame(vec![square("a", 0.0), square("b", 20.0)]);
        let mut recorder = Recorder::default();
        frame.draw(&mut recorder);
        assert_eq!(recorder.0, ["begin", "a", "b", "end"]);
    }
}
