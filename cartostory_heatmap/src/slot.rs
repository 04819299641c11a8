// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative overlay configuration.
//!
//! A heatmap is configured with a list of [`Slot`]s. Each slot carries the
//! options of one overlay (legend, tooltip or region label) and nothing else;
//! the heatmap looks slots up by their [`SlotKind`] tag. Only the first slot of
//! each kind is used.

use core::fmt;
use std::sync::Arc;

use cartostory_legend::{
    DEFAULT_BAR_HEIGHT, DEFAULT_STEP, DEFAULT_TITLE, Domain, Formatter, LegendSpec, ScaleKind,
};
use cartostory_topology::{DataEntry, Record, RegionId};
use kurbo::Size;
use peniko::Color;

/// The tag that identifies what a slot configures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// A legend explaining the color scale.
    Legend,
    /// A tooltip shown over regions.
    Tooltip,
    /// A fixed-size label centered on each region.
    RegionLabel,
}

/// One overlay configuration.
#[derive(Clone, Debug)]
pub enum Slot<M = Record> {
    /// Legend options.
    Legend(LegendSlot),
    /// Tooltip options.
    Tooltip(TooltipSlot<M>),
    /// Region label options.
    RegionLabel(RegionLabelSlot<M>),
}

impl<M> Slot<M> {
    /// Returns this slot's tag.
    #[must_use]
    pub fn kind(&self) -> SlotKind {
        match self {
            Self::Legend(_) => SlotKind::Legend,
            Self::Tooltip(_) => SlotKind::Tooltip,
            Self::RegionLabel(_) => SlotKind::RegionLabel,
        }
    }
}

impl<M> From<LegendSlot> for Slot<M> {
    fn from(slot: LegendSlot) -> Self {
        Self::Legend(slot)
    }
}

impl<M> From<TooltipSlot<M>> for Slot<M> {
    fn from(slot: TooltipSlot<M>) -> Self {
        Self::Tooltip(slot)
    }
}

impl<M> From<RegionLabelSlot<M>> for Slot<M> {
    fn from(slot: RegionLabelSlot<M>) -> Self {
        Self::RegionLabel(slot)
    }
}

/// Returns the first slot of `kind`, if any.
pub fn extract_slot<M>(slots: &[Slot<M>], kind: SlotKind) -> Option<&Slot<M>> {
    slots.iter().find(|slot| slot.kind() == kind)
}

/// The declared slots of a heatmap.
#[derive(Clone, Debug)]
pub struct Slots<M = Record>(Vec<Slot<M>>);

impl<M> Default for Slots<M> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<M> Slots<M> {
    /// Creates an empty slot list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the declared slots in order.
    #[must_use]
    pub fn as_slice(&self) -> &[Slot<M>] {
        &self.0
    }

    /// Returns the first slot of `kind`, if any.
    #[must_use]
    pub fn find(&self, kind: SlotKind) -> Option<&Slot<M>> {
        extract_slot(&self.0, kind)
    }

    /// Returns the legend options, if a legend is declared.
    #[must_use]
    pub fn legend(&self) -> Option<&LegendSlot> {
        match self.find(SlotKind::Legend)? {
            Slot::Legend(slot) => Some(slot),
            _ => None,
        }
    }

    /// Returns the tooltip options, if a tooltip is declared.
    #[must_use]
    pub fn tooltip(&self) -> Option<&TooltipSlot<M>> {
        match self.find(SlotKind::Tooltip)? {
            Slot::Tooltip(slot) => Some(slot),
            _ => None,
        }
    }

    /// Returns the region label options, if labels are declared.
    #[must_use]
    pub fn region_label(&self) -> Option<&RegionLabelSlot<M>> {
        match self.find(SlotKind::RegionLabel)? {
            Slot::RegionLabel(slot) => Some(slot),
            _ => None,
        }
    }
}

impl<M> From<Vec<Slot<M>>> for Slots<M> {
    fn from(slots: Vec<Slot<M>>) -> Self {
        Self(slots)
    }
}

impl<M> From<Slot<M>> for Slots<M> {
    fn from(slot: Slot<M>) -> Self {
        Self(vec![slot])
    }
}

impl<M> FromIterator<Slot<M>> for Slots<M> {
    fn from_iter<I: IntoIterator<Item = Slot<M>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// What a content function sees about a region.
#[derive(Debug)]
pub struct RegionContext<'a, M = Record> {
    /// The region's id.
    pub id: &'a RegionId,
    /// The value used for its fill.
    pub value: f64,
    /// Its dataset entry.
    pub data: Option<&'a DataEntry>,
    /// Its metadata entry, when metadata is configured.
    pub metadata: Option<&'a M>,
    /// The geometry's own properties.
    pub properties: &'a Record,
}

/// Produces tooltip or label text for a region.
pub struct ContentFn<M = Record>(Arc<dyn Fn(&RegionContext<'_, M>) -> String + Send + Sync>);

impl<M> ContentFn<M> {
    /// Wraps a content function.
    pub fn new(f: impl Fn(&RegionContext<'_, M>) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Produces the content for `cx`.
    #[must_use]
    pub fn call(&self, cx: &RegionContext<'_, M>) -> String {
        (self.0)(cx)
    }
}

impl<M> Clone for ContentFn<M> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<M> fmt::Debug for ContentFn<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContentFn(..)")
    }
}

/// Maps legend values to colors, replacing the heatmap's own scale.
#[derive(Clone)]
pub struct ColorFn(Arc<dyn Fn(f64) -> Color + Send + Sync>);

impl ColorFn {
    /// Wraps a color function.
    pub fn new(f: impl Fn(f64) -> Color + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Maps `value` to a color.
    #[must_use]
    pub fn color(&self, value: f64) -> Color {
        (self.0)(value)
    }
}

impl fmt::Debug for ColorFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ColorFn(..)")
    }
}

/// Legend options.
///
/// The domain and colors default to the heatmap's own.
#[derive(Clone, Debug)]
pub struct LegendSlot {
    /// Heading. Default: `"Legend"`.
    pub title: String,
    /// Breakpoints overriding the heatmap's domain.
    pub domain: Option<Domain>,
    /// Spacing of discrete values. Default: `5`.
    pub step: f64,
    /// Discrete or continuous. Default: discrete.
    pub kind: ScaleKind,
    /// Color mapping overriding the heatmap's scale.
    pub color: Option<ColorFn>,
    /// Label formatter.
    pub formatter: Option<Formatter>,
    /// Caption for the minimum of a continuous bar.
    pub min_value_label: Option<String>,
    /// Caption for the maximum of a continuous bar.
    pub max_value_label: Option<String>,
    /// Height of a continuous bar. Default: `200`.
    pub height: f64,
}

impl Default for LegendSlot {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.into(),
            domain: None,
            step: DEFAULT_STEP,
            kind: ScaleKind::Discrete,
            color: None,
            formatter: None,
            min_value_label: None,
            max_value_label: None,
            height: DEFAULT_BAR_HEIGHT,
        }
    }
}

impl LegendSlot {
    /// Returns the legend inputs, using `domain` unless overridden.
    #[must_use]
    pub fn spec(&self, domain: &[f64]) -> LegendSpec {
        LegendSpec {
            title: self.title.clone(),
            domain: self
                .domain
                .clone()
                .unwrap_or_else(|| domain.iter().copied().collect()),
            step: self.step,
            kind: self.kind,
            formatter: self.formatter.clone(),
            min_value_label: self.min_value_label.clone(),
            max_value_label: self.max_value_label.clone(),
            height: self.height,
        }
    }
}

/// When a tooltip opens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TooltipTrigger {
    /// On pointer hover.
    #[default]
    Hover,
    /// On click.
    Click,
}

/// Which side of the pointer or region a tooltip sits on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TooltipPosition {
    /// Above.
    #[default]
    Top,
    /// To the right.
    Right,
    /// Below.
    Bottom,
    /// To the left.
    Left,
}

impl TooltipPosition {
    /// Returns the lowercase name used in markup.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }
}

/// Tooltip options.
#[derive(Clone, Debug)]
pub struct TooltipSlot<M = Record> {
    /// When the tooltip opens.
    pub trigger: TooltipTrigger,
    /// Whether the tooltip follows the pointer.
    pub float: bool,
    /// Where the tooltip sits.
    pub position: TooltipPosition,
    /// Custom content; the region id is shown otherwise.
    pub content: Option<ContentFn<M>>,
}

impl<M> Default for TooltipSlot<M> {
    fn default() -> Self {
        Self {
            trigger: TooltipTrigger::Hover,
            float: false,
            position: TooltipPosition::Top,
            content: None,
        }
    }
}

/// Default region label width.
pub const DEFAULT_LABEL_WIDTH: f64 = 75.0;

/// Default region label height.
pub const DEFAULT_LABEL_HEIGHT: f64 = 50.0;

/// Region label options.
#[derive(Clone, Debug)]
pub struct RegionLabelSlot<M = Record> {
    /// Label box width. Default: `75`.
    pub width: f64,
    /// Label box height. Default: `50`.
    pub height: f64,
    /// Custom content; the region id is shown otherwise.
    pub content: Option<ContentFn<M>>,
}

impl<M> Default for RegionLabelSlot<M> {
    fn default() -> Self {
        Self {
            width: DEFAULT_LABEL_WIDTH,
            height: DEFAULT_LABEL_HEIGHT,
            content: None,
        }
    }
}

impl<M> RegionLabelSlot<M> {
    /// Returns the label box size.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}
