// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use cartostory_legend::{ColorScale, Domain, Legend, ScaleError};
use cartostory_projection::{Mercator, ProjectionSettings, center_rect, project_geometry};
use cartostory_topology::validate::{
    validate_data_keys, validate_geometries_have_id, validate_metadata_keys,
};
use cartostory_topology::{
    DataEntry, Dataset, Feature, Record, RegionId, Topology, TopologyError, Violation,
    first_feature_collection, region_id,
};
use kurbo::{BezPath, Point, Rect, Shape};
use smallvec::smallvec;

use crate::config::HeatmapConfig;
use crate::frame::{Frame, LabelOverlay, RegionState, RegionVisual, TooltipSettings};
use crate::selection::RegionSelection;
use crate::slot::{ContentFn, RegionContext, Slots};

/// Called when a region is clicked.
pub type ClickHandler = Box<dyn FnMut(&RegionEvent<'_>)>;

/// Called with the whole selection after every change.
pub type SelectHandler = Box<dyn FnMut(&[RegionId])>;

/// The region a click landed on.
#[derive(Clone, Copy, Debug)]
pub struct RegionEvent<'a> {
    /// The region's id, when its id path resolves.
    pub id: Option<&'a RegionId>,
    /// The clicked feature.
    pub feature: &'a Feature,
}

/// Where a heatmap is in its update cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Built but never rendered.
    #[default]
    Uninitialized,
    /// Checking ids and dataset coverage.
    Validating,
    /// Rebuilding the projection and region outlines.
    Projecting,
    /// Deriving the frame; also the resting state after a render.
    Rendering,
}

/// Errors from building or updating a heatmap.
#[derive(Debug)]
pub enum HeatmapError {
    /// The topology could not be converted into features.
    Topology(TopologyError),
    /// The color scale could not be built.
    Scale(ScaleError),
}

impl fmt::Display for HeatmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topology(err) => write!(f, "invalid topology: {err}"),
            Self::Scale(err) => write!(f, "invalid color scale: {err}"),
        }
    }
}

impl core::error::Error for HeatmapError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Topology(err) => Some(err),
            Self::Scale(err) => Some(err),
        }
    }
}

impl From<TopologyError> for HeatmapError {
    fn from(err: TopologyError) -> Self {
        Self::Topology(err)
    }
}

impl From<ScaleError> for HeatmapError {
    fn from(err: ScaleError) -> Self {
        Self::Scale(err)
    }
}

/// A process-unique heatmap identifier, used to namespace element ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw counter value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hm{}", self.0)
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Pending: u8 {
        const VALIDATE = 0b01;
        const PROJECT  = 0b10;
    }
}

/// Projection output for the current features, replaced as a whole.
#[derive(Clone, Debug)]
struct Projected {
    projection: Mercator,
    paths: Vec<BezPath>,
    centroids: Vec<Point>,
}

impl Projected {
    fn new(config: &HeatmapConfig, features: &[Feature]) -> Self {
        let projection = config.projection.build(config.viewport, features);
        let paths = features
            .iter()
            .map(|feature| project_geometry(&projection, &feature.geometry))
            .collect();
        let centroids = features
            .iter()
            .map(|feature| {
                feature
                    .centroid()
                    .map_or(Point::ORIGIN, |c| projection.project(c))
            })
            .collect();
        Self {
            projection,
            paths,
            centroids,
        }
    }
}

/// Collects the inputs of a [`Heatmap`].
pub struct HeatmapBuilder<M = Record> {
    topology: Topology,
    data: Dataset<DataEntry>,
    metadata: Option<Dataset<M>>,
    config: HeatmapConfig,
    slots: Slots<M>,
    on_click: Option<ClickHandler>,
    on_select: Option<SelectHandler>,
}

impl HeatmapBuilder {
    /// Starts a heatmap of `data` over `topology`.
    #[must_use]
    pub fn new(topology: Topology, data: Dataset<DataEntry>) -> Self {
        Self::with_parts(topology, data, None)
    }
}

impl<M> HeatmapBuilder<M> {
    /// Starts a heatmap whose tooltip and label content come from `metadata`.
    #[must_use]
    pub fn with_metadata(
        topology: Topology,
        data: Dataset<DataEntry>,
        metadata: Dataset<M>,
    ) -> Self {
        Self::with_parts(topology, data, Some(metadata))
    }

    fn with_parts(
        topology: Topology,
        data: Dataset<DataEntry>,
        metadata: Option<Dataset<M>>,
    ) -> Self {
        Self {
            topology,
            data,
            metadata,
            config: HeatmapConfig::default(),
            slots: Slots::new(),
            on_click: None,
            on_select: None,
        }
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: HeatmapConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the id path.
    #[must_use]
    pub fn id_path(mut self, id_path: impl Into<String>) -> Self {
        self.config.id_path = id_path.into();
        self
    }

    /// Sets the value key.
    #[must_use]
    pub fn value_key(mut self, value_key: impl Into<String>) -> Self {
        self.config.value_key = Some(value_key.into());
        self
    }

    /// Sets the projection parameters.
    #[must_use]
    pub fn projection(mut self, projection: ProjectionSettings) -> Self {
        self.config.projection = projection;
        self
    }

    /// Declares the overlay slots.
    #[must_use]
    pub fn slots(mut self, slots: impl Into<Slots<M>>) -> Self {
        self.slots = slots.into();
        self
    }

    /// Sets the click handler.
    #[must_use]
    pub fn on_click(mut self, handler: impl FnMut(&RegionEvent<'_>) + 'static) -> Self {
        self.on_click = Some(Box::new(handler));
        self
    }

    /// Sets the selection handler, enabling selection.
    #[must_use]
    pub fn on_select(mut self, handler: impl FnMut(&[RegionId]) + 'static) -> Self {
        self.on_select = Some(Box::new(handler));
        self
    }

    /// Converts the topology, checks the configuration and computes the
    /// initial projection.
    ///
    /// Validation is deferred to the first render.
    pub fn build(self) -> Result<Heatmap<M>, HeatmapError> {
        self.config.validate()?;
        let features = first_feature_collection(&self.topology)?;
        let instance = InstanceId::next();
        log::debug!("heatmap {instance} built with {} features", features.len());
        let projected = Projected::new(&self.config, &features);
        Ok(Heatmap {
            instance,
            label_order: (0..features.len()).collect(),
            topology: self.topology,
            features,
            data: self.data,
            metadata: self.metadata,
            config: self.config,
            slots: self.slots,
            on_click: self.on_click,
            on_select: self.on_select,
            selection: RegionSelection::new(),
            projected,
            pending: Pending::VALIDATE,
            phase: Phase::Uninitialized,
            diagnostics: Vec::new(),
        })
    }
}

impl<M> fmt::Debug for HeatmapBuilder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeatmapBuilder")
            .field("config", &self.config)
            .field("data", &self.data.len())
            .field("metadata", &self.metadata.as_ref().map(Dataset::len))
            .field("on_click", &self.on_click.is_some())
            .field("on_select", &self.on_select.is_some())
            .finish_non_exhaustive()
    }
}

/// A choropleth heatmap over a TopoJSON topology.
///
/// Inputs are set through the builder and the `set_*` methods. Changes are
/// recorded as pending work and applied by the next [`render`](Self::render):
/// - topology, dataset, metadata, id path and value key changes re-run
///   validation,
/// - topology and projection changes rebuild the projection and every region
///   outline together.
///
/// Selection is enabled only while a selection handler is set.
pub struct Heatmap<M = Record> {
    instance: InstanceId,
    topology: Topology,
    features: Vec<Feature>,
    data: Dataset<DataEntry>,
    metadata: Option<Dataset<M>>,
    config: HeatmapConfig,
    slots: Slots<M>,
    on_click: Option<ClickHandler>,
    on_select: Option<SelectHandler>,
    selection: RegionSelection,
    label_order: Vec<usize>,
    projected: Projected,
    pending: Pending,
    phase: Phase,
    diagnostics: Vec<Violation>,
}

impl<M> fmt::Debug for Heatmap<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heatmap")
            .field("instance", &self.instance)
            .field("phase", &self.phase)
            .field("features", &self.features.len())
            .field("data", &self.data.len())
            .field("config", &self.config)
            .field("selection", &self.selection)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl<M> Heatmap<M> {
    /// Returns this heatmap's instance id.
    #[must_use]
    pub fn instance_id(&self) -> InstanceId {
        self.instance
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    /// Returns the topology.
    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Returns the features drawn as regions, in drawing order.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Returns the selected regions in pick order.
    #[must_use]
    pub fn selection(&self) -> &[RegionId] {
        self.selection.items()
    }

    /// Returns a counter that changes whenever the selection changes.
    ///
    /// Hosts can compare it against a stored value to skip redraws.
    #[must_use]
    pub fn selection_revision(&self) -> u64 {
        self.selection.revision()
    }

    /// Returns the projection of the latest projection pass.
    #[must_use]
    pub fn projection(&self) -> Mercator {
        self.projected.projection
    }

    /// Returns the validation findings of the latest pass.
    ///
    /// Each check reports at most its first failure.
    #[must_use]
    pub fn diagnostics(&self) -> &[Violation] {
        &self.diagnostics
    }

    /// Replaces the topology.
    ///
    /// On error nothing changes. On success the label order is reset.
    pub fn set_topology(&mut self, topology: Topology) -> Result<(), HeatmapError> {
        let features = first_feature_collection(&topology).inspect_err(|err| {
            log::error!("heatmap {}: topology rejected: {err}", self.instance);
        })?;
        self.label_order = (0..features.len()).collect();
        self.topology = topology;
        self.features = features;
        self.pending |= Pending::VALIDATE | Pending::PROJECT;
        Ok(())
    }

    /// Replaces the dataset.
    pub fn set_data(&mut self, data: Dataset<DataEntry>) {
        self.data = data;
        self.pending |= Pending::VALIDATE;
    }

    /// Replaces or removes the metadata.
    pub fn set_metadata(&mut self, metadata: Option<Dataset<M>>) {
        self.metadata = metadata;
        self.pending |= Pending::VALIDATE;
    }

    /// Changes the id path.
    pub fn set_id_path(&mut self, id_path: impl Into<String>) {
        self.config.id_path = id_path.into();
        self.pending |= Pending::VALIDATE;
    }

    /// Changes the value key.
    pub fn set_value_key(&mut self, value_key: Option<String>) {
        self.config.value_key = value_key;
        self.pending |= Pending::VALIDATE;
    }

    /// Changes the projection parameters.
    pub fn set_projection(&mut self, projection: ProjectionSettings) {
        self.config.projection = projection;
        self.pending |= Pending::PROJECT;
    }

    /// Replaces the overlay slots.
    pub fn set_slots(&mut self, slots: impl Into<Slots<M>>) {
        self.slots = slots.into();
    }

    /// Sets or removes the click handler.
    pub fn set_on_click(&mut self, handler: Option<ClickHandler>) {
        self.on_click = handler;
    }

    /// Sets or removes the selection handler.
    ///
    /// Removing it disables selection and clears the selection set.
    pub fn set_on_select(&mut self, handler: Option<SelectHandler>) {
        if handler.is_none() {
            self.selection.clear();
        }
        self.on_select = handler;
    }

    /// Returns the color domain: the configured one, or `[0, max]` over the
    /// dataset values.
    #[must_use]
    pub fn color_domain(&self) -> Domain {
        if let Some(domain) = &self.config.domain {
            return domain.clone();
        }
        let value_key = self.config.value_key.as_deref();
        let max = self
            .data
            .values()
            .map(|entry| entry.value(value_key))
            .reduce(f64::max)
            .unwrap_or(0.0);
        smallvec![0.0, max]
    }

    /// Builds the active color scale.
    pub fn color_scale(&self) -> Result<ColorScale, ScaleError> {
        ColorScale::new(self.color_domain(), self.config.color_range.iter().copied())
    }

    /// Returns the value that colors the region `id`.
    ///
    /// Missing entries count as zero.
    #[must_use]
    pub fn region_value(&self, id: &RegionId) -> f64 {
        self.data
            .get(id.as_str())
            .map_or(0.0, |entry| entry.value(self.config.value_key.as_deref()))
    }

    /// Clicks the region `id`.
    ///
    /// Calls the click handler, then toggles the region when selection is
    /// enabled. Returns `false` if no region has that id.
    pub fn click(&mut self, id: &RegionId) -> bool {
        let id_path = &self.config.id_path;
        let Some(index) = self
            .features
            .iter()
            .position(|feature| region_id(feature, id_path).as_ref() == Some(id))
        else {
            return false;
        };
        self.click_index(index);
        true
    }

    /// Clicks whatever region is drawn at `point`, in viewport coordinates.
    ///
    /// Later regions are drawn over earlier ones and win. Returns the clicked
    /// region's id, or `None` if the point hits nothing or a region without id.
    pub fn click_at(&mut self, point: Point) -> Option<RegionId> {
        self.flush();
        let index = self
            .projected
            .paths
            .iter()
            .rposition(|path| path.contains(point))?;
        self.click_index(index)
    }

    /// Promotes the label of region `id` above all other labels.
    ///
    /// Returns `false` if no region has that id.
    pub fn pointer_enter_label(&mut self, id: &RegionId) -> bool {
        let id_path = &self.config.id_path;
        let features = &self.features;
        let Some(slot) = self
            .label_order
            .iter()
            .position(|&i| region_id(&features[i], id_path).as_ref() == Some(id))
        else {
            return false;
        };
        let index = self.label_order.remove(slot);
        self.label_order.push(index);
        true
    }

    fn click_index(&mut self, index: usize) -> Option<RegionId> {
        let feature = &self.features[index];
        let id = region_id(feature, &self.config.id_path);
        if let Some(handler) = &mut self.on_click {
            handler(&RegionEvent {
                id: id.as_ref(),
                feature,
            });
        }
        if let (Some(handler), Some(id)) = (&mut self.on_select, &id) {
            let selected = self.selection.toggle(id.clone());
            log::debug!(
                "heatmap {}: region {id} {}",
                self.instance,
                if selected { "selected" } else { "deselected" }
            );
            handler(self.selection.items());
        }
        id
    }

    /// Applies pending validation and projection work.
    pub fn flush(&mut self) {
        if self.pending.contains(Pending::VALIDATE) {
            self.phase = Phase::Validating;
            self.validate();
        }
        if self.pending.contains(Pending::PROJECT) {
            self.phase = Phase::Projecting;
            self.project();
        }
        self.pending = Pending::empty();
    }

    fn validate(&mut self) {
        let id_path = &self.config.id_path;
        let mut found = Vec::new();
        if let Err(violation) = validate_geometries_have_id(&self.topology, id_path) {
            found.push(violation);
        }
        let value_key = self.config.value_key.as_deref();
        if let Err(violation) = validate_data_keys(&self.topology, &self.data, id_path, value_key) {
            found.push(violation);
        }
        if let Some(metadata) = &self.metadata
            && let Err(violation) = validate_metadata_keys(&self.data, metadata)
        {
            found.push(violation);
        }
        self.diagnostics = found;
    }

    fn project(&mut self) {
        self.projected = Projected::new(&self.config, &self.features);
    }

    /// Applies pending work and derives a frame.
    pub fn render(&mut self) -> Result<Frame, HeatmapError> {
        self.flush();
        self.phase = Phase::Rendering;
        let scale = self.color_scale()?;
        let domain = self.color_domain();

        let projected = &self.projected;
        let id_path = &self.config.id_path;
        let ids: Vec<Option<RegionId>> = self
            .features
            .iter()
            .map(|feature| region_id(feature, id_path))
            .collect();

        let tooltip_slot = self.slots.tooltip();
        let label_slot = self.slots.region_label();

        let regions: Vec<RegionVisual> = self
            .features
            .iter()
            .zip(&ids)
            .zip(&projected.paths)
            .map(|((feature, id), path)| {
                let raw = id.as_ref().map_or("", RegionId::as_str);
                let value = id.as_ref().map_or(0.0, |id| self.region_value(id));
                let mut state = RegionState::empty();
                if id.as_ref().is_some_and(|id| self.selection.contains(id)) {
                    state |= RegionState::SELECTED;
                }
                if id.as_ref().is_some_and(|id| self.data.contains_key(id.as_str())) {
                    state |= RegionState::HAS_DATA;
                }
                RegionVisual {
                    key: format!("geo-{}-{raw}", self.instance),
                    id: id.clone(),
                    path: path.clone(),
                    fill: scale.color(value),
                    value,
                    state,
                    tooltip: self.content(
                        tooltip_slot.and_then(|slot| slot.content.as_ref()),
                        id.as_ref(),
                        feature,
                    ),
                    label: self.content(
                        label_slot.and_then(|slot| slot.content.as_ref()),
                        id.as_ref(),
                        feature,
                    ),
                }
            })
            .collect();

        let labels = match label_slot {
            Some(slot) => self
                .label_order
                .iter()
                .map(|&i| {
                    let raw = ids[i].as_ref().map_or("", RegionId::as_str);
                    let origin = center_rect(projected.centroids[i], slot.size());
                    LabelOverlay {
                        key: format!("{}_label_{raw}", self.instance),
                        region: ids[i].clone(),
                        rect: Rect::from_origin_size(origin, slot.size()),
                        content: regions[i].label.clone(),
                    }
                })
                .collect(),
            None => Vec::new(),
        };

        let legend: Option<Legend> = self.slots.legend().map(|slot| {
            let spec = slot.spec(&domain);
            match &slot.color {
                Some(color) => spec.build(|v| color.color(v)),
                None => spec.build(|v| scale.color(v)),
            }
        });

        let tooltip = tooltip_slot.map(|slot| TooltipSettings {
            id: format!("tooltip-{}", self.instance),
            trigger: slot.trigger,
            float: slot.float,
            position: slot.position,
        });

        log::trace!(
            "heatmap {}: rendered {} regions, {} labels",
            self.instance,
            regions.len(),
            labels.len()
        );
        Ok(Frame {
            viewport: self.config.viewport,
            label_id: format!("region-label-{}", self.instance),
            regions,
            labels,
            legend,
            tooltip,
        })
    }

    /// Custom content when the region has a content source, its raw id
    /// otherwise.
    ///
    /// The content source is the metadata entry when metadata is configured,
    /// the dataset entry otherwise.
    fn content(
        &self,
        content: Option<&ContentFn<M>>,
        id: Option<&RegionId>,
        feature: &Feature,
    ) -> String {
        let Some(id) = id else {
            return String::new();
        };
        let data = self.data.get(id.as_str());
        let metadata = self.metadata.as_ref().and_then(|m| m.get(id.as_str()));
        let has_source = match &self.metadata {
            Some(_) => metadata.is_some(),
            None => data.is_some(),
        };
        match content {
            Some(content) if has_source => content.call(&RegionContext {
                id,
                value: self.region_value(id),
                data,
                metadata,
                properties: &feature.properties,
            }),
            _ => id.to_string(),
        }
    }
}
