// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=cartostory_heatmap --heading-base-level=0

//! Cartostory Heatmap: choropleth maps from TopoJSON and a keyed dataset.
//!
//! A [`Heatmap`] ties the other Cartostory crates together:
//! - it validates that every geometry has an id and every id has data, logging
//!   what is missing without ever refusing to draw,
//! - it derives a [`ColorScale`](cartostory_legend::ColorScale) from the
//!   dataset (or a fixed domain),
//! - it projects the first object of the topology into a fixed viewport,
//! - and it emits a [`Frame`]: one [`RegionVisual`] per geometry with its fill,
//!   tooltip and label text, plus optional label overlays and a legend.
//!
//! Overlays are declared as [`Slot`]s, tagged by [`SlotKind`]. A slot carries
//! configuration only; declaring a [`TooltipSlot`] turns tooltips on, a
//! [`RegionLabelSlot`] adds a label box over each region, and a [`LegendSlot`]
//! adds a legend.
//!
//! Clicking a region calls the click handler and, when a selection handler is
//! set, toggles the region in the selection and reports the new selection.
//!
//! Frames are backend-agnostic. Implement [`RegionSink`] to draw them, or use
//! [`SvgSink`] to produce a standalone SVG document.
//!
//! ## Minimal example
//!
//! ```rust
//! use cartostory_heatmap::{HeatmapBuilder, LegendSlot, Slot, SvgSink};
//! use cartostory_topology::{DataEntry, Dataset, Topology};
//!
//! let topology = Topology::from_json(
//!     r#"{
//!         "type": "Topology",
//!         "arcs": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]],
//!         "objects": {
//!             "regions": {
//!                 "type": "GeometryCollection",
//!                 "geometries": [{ "type": "Polygon", "arcs": [[0]], "id": "A" }]
//!             }
//!         }
//!     }"#,
//! )
//! .unwrap();
//! let data: Dataset<DataEntry> = serde_json::from_str(r#"{ "A": { "sales": 12 } }"#).unwrap();
//!
//! let mut heatmap = HeatmapBuilder::new(topology, data)
//!     .value_key("sales")
//!     .slots(vec![Slot::from(LegendSlot::default())])
//!     .build()
//!     .unwrap();
//!
//! let frame = heatmap.render().unwrap();
//! assert_eq!(frame.regions.len(), 1);
//! assert_eq!(frame.regions[0].value, 12.0);
//! assert!(heatmap.diagnostics().is_empty());
//!
//! let svg = SvgSink::render(&frame);
//! assert!(svg.starts_with("<svg"));
//! ```

mod config;
mod frame;
mod heatmap;
mod selection;
mod slot;
mod svg;

pub use config::{DEFAULT_VIEWPORT, HeatmapConfig, HeatmapOptions};
pub use frame::{Frame, LabelOverlay, RegionSink, RegionState, RegionVisual, TooltipSettings};
pub use heatmap::{
    ClickHandler, Heatmap, HeatmapBuilder, HeatmapError, InstanceId, Phase, RegionEvent,
    SelectHandler,
};
pub use selection::RegionSelection;
pub use slot::{
    ColorFn, ContentFn, DEFAULT_LABEL_HEIGHT, DEFAULT_LABEL_WIDTH, LegendSlot, RegionContext,
    RegionLabelSlot, Slot, SlotKind, Slots, TooltipPosition, TooltipSlot, TooltipTrigger,
    extract_slot,
};
pub use svg::SvgSink;
