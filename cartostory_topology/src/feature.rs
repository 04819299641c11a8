// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion of topology objects into planar features.
//!
//! Features are expressed in the topology's own coordinate space, which for
//! geographic data is longitude (x) and latitude (y) in degrees. Shared arcs are
//! decoded once per conversion and stitched into lines and rings.

use kurbo::{Point, Vec2};
use serde_json::Value;

use crate::error::TopologyError;
use crate::model::{Geometry, GeometryKind, Position, Record, Topology, Transform};
use crate::property::PropertySource;

/// Planar geometry of a feature.
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureGeometry {
    /// A single point.
    Point(Point),
    /// Several points.
    MultiPoint(Vec<Point>),
    /// An open polyline.
    LineString(Vec<Point>),
    /// Several polylines.
    MultiLineString(Vec<Vec<Point>>),
    /// Closed rings; the first is the exterior, the rest are holes.
    Polygon(Vec<Vec<Point>>),
    /// Several polygons.
    MultiPolygon(Vec<Vec<Vec<Point>>>),
    /// Nested geometries.
    Collection(Vec<FeatureGeometry>),
}

/// A region ready for projection: geometry plus the id and properties it was
/// declared with.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    /// The geometry's direct identifier.
    pub id: Option<Value>,
    /// The geometry's properties.
    pub properties: Record,
    /// Decoded planar geometry.
    pub geometry: FeatureGeometry,
}

impl PropertySource for Feature {
    fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    fn properties(&self) -> &Record {
        &self.properties
    }
}

impl Feature {
    /// Returns the centroid of this feature's geometry.
    #[must_use]
    pub fn centroid(&self) -> Option<Point> {
        self.geometry.centroid()
    }
}

impl FeatureGeometry {
    /// Calls `f` for every vertex, in order.
    pub fn visit_points(&self, f: &mut impl FnMut(Point)) {
        match self {
            Self::Point(p) => f(*p),
            Self::MultiPoint(points) | Self::LineString(points) => points.iter().copied().for_each(f),
            Self::MultiLineString(lines) | Self::Polygon(lines) => {
                lines.iter().flatten().copied().for_each(f);
            }
            Self::MultiPolygon(polygons) => {
                polygons.iter().flatten().flatten().copied().for_each(f);
            }
            Self::Collection(children) => {
                for child in children {
                    child.visit_points(f);
                }
            }
        }
    }

    /// Returns the area-weighted centroid of the polygonal parts.
    ///
    /// Exterior rings add area and holes subtract it regardless of winding.
    /// Geometry without area falls back to the mean of its vertices, and empty
    /// geometry has no centroid.
    ///
    /// This is a planar centroid in the input coordinate space, which is close
    /// to the spherical one for regions of ordinary size.
    #[must_use]
    pub fn centroid(&self) -> Option<Point> {
        let mut moments = AreaMoments::default();
        self.accumulate_area(&mut moments);
        if moments.area.abs() > f64::EPSILON {
            return Some((moments.moment / moments.area).to_point());
        }

        let mut sum = Vec2::ZERO;
        let mut count = 0_u32;
        self.visit_points(&mut |p| {
            sum += p.to_vec2();
            count += 1;
        });
        (count > 0).then(|| (sum / f64::from(count)).to_point())
    }

    fn accumulate_area(&self, moments: &mut AreaMoments) {
        match self {
            Self::Polygon(rings) => moments.add_polygon(rings),
            Self::MultiPolygon(polygons) => {
                for rings in polygons {
                    moments.add_polygon(rings);
                }
            }
            Self::Collection(children) => {
                for child in children {
                    child.accumulate_area(moments);
                }
            }
            _ => {}
        }
    }
}

#[derive(Default)]
struct AreaMoments {
    area: f64,
    moment: Vec2,
}

impl AreaMoments {
    fn add_polygon(&mut self, rings: &[Vec<Point>]) {
        for (i, ring) in rings.iter().enumerate() {
            let (area, moment) = ring_moments(ring);
            if area == 0.0 {
                continue;
            }
            let sign = if i == 0 { 1.0 } else { -1.0 };
            let weight = sign * area.signum();
            self.area += weight * area;
            self.moment += weight * moment;
        }
    }
}

/// Signed shoelace area and first moment of a ring.
fn ring_moments(ring: &[Point]) -> (f64, Vec2) {
    let mut twice_area = 0.0;
    let mut moment = Vec2::ZERO;
    for pair in ring.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let cross = a.x * b.y - b.x * a.y;
        twice_area += cross;
        moment += (a.to_vec2() + b.to_vec2()) * cross;
    }
    (twice_area / 2.0, moment / 6.0)
}

/// Decodes every arc of `topology` into absolute coordinates.
///
/// Quantized topologies (those with a transform) store delta-encoded integer
/// positions; those are accumulated and mapped through the transform.
#[must_use]
pub fn decode_arcs(topology: &Topology) -> Vec<Vec<Point>> {
    topology
        .arcs
        .iter()
        .map(|arc| match topology.transform {
            Some(transform) => {
                let mut acc = [0.0, 0.0];
                arc.iter()
                    .map(|&Position([dx, dy])| {
                        acc[0] += dx;
                        acc[1] += dy;
                        apply_transform(transform, acc)
                    })
                    .collect()
            }
            None => arc.iter().map(|&Position([x, y])| Point::new(x, y)).collect(),
        })
        .collect()
}

fn apply_transform(transform: Transform, [x, y]: [f64; 2]) -> Point {
    Point::new(
        x * transform.scale[0] + transform.translate[0],
        y * transform.scale[1] + transform.translate[1],
    )
}

/// Converts the named object into features.
///
/// A `GeometryCollection` yields one feature per member; any other object
/// yields a single feature.
pub fn feature_collection(topology: &Topology, name: &str) -> Result<Vec<Feature>, TopologyError> {
    let object = topology
        .objects
        .get(name)
        .ok_or_else(|| TopologyError::MissingObject(name.into()))?;
    features_of(topology, object)
}

/// Converts the first declared object into features.
pub fn first_feature_collection(topology: &Topology) -> Result<Vec<Feature>, TopologyError> {
    let (_, object) = topology.first_object().ok_or(TopologyError::NoObjects)?;
    features_of(topology, object)
}

fn features_of(topology: &Topology, object: &Geometry) -> Result<Vec<Feature>, TopologyError> {
    let decoder = Decoder {
        arcs: decode_arcs(topology),
        transform: topology.transform,
    };
    match &object.kind {
        GeometryKind::GeometryCollection { geometries } => geometries
            .iter()
            .map(|geometry| decoder.feature(geometry))
            .collect(),
        _ => Ok(vec![decoder.feature(object)?]),
    }
}

struct Decoder {
    arcs: Vec<Vec<Point>>,
    transform: Option<Transform>,
}

impl Decoder {
    fn feature(&self, geometry: &Geometry) -> Result<Feature, TopologyError> {
        Ok(Feature {
            id: geometry.id.clone(),
            properties: geometry.properties.clone(),
            geometry: self.geometry(&geometry.kind)?,
        })
    }

    fn geometry(&self, kind: &GeometryKind) -> Result<FeatureGeometry, TopologyError> {
        Ok(match kind {
            GeometryKind::Point { coordinates } => FeatureGeometry::Point(self.position(*coordinates)),
            GeometryKind::MultiPoint { coordinates } => FeatureGeometry::MultiPoint(
                coordinates.iter().map(|&p| self.position(p)).collect(),
            ),
            GeometryKind::LineString { arcs } => FeatureGeometry::LineString(self.line(arcs)?),
            GeometryKind::MultiLineString { arcs } => FeatureGeometry::MultiLineString(
                arcs.iter().map(|line| self.line(line)).collect::<Result<_, _>>()?,
            ),
            GeometryKind::Polygon { arcs } => FeatureGeometry::Polygon(self.polygon(arcs)?),
            GeometryKind::MultiPolygon { arcs } => FeatureGeometry::MultiPolygon(
                arcs.iter()
                    .map(|rings| self.polygon(rings))
                    .collect::<Result<_, _>>()?,
            ),
            GeometryKind::GeometryCollection { geometries } => FeatureGeometry::Collection(
                geometries
                    .iter()
                    .map(|child| self.geometry(&child.kind))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    fn position(&self, Position(xy): Position) -> Point {
        match self.transform {
            Some(transform) => apply_transform(transform, xy),
            None => Point::new(xy[0], xy[1]),
        }
    }

    fn arc(&self, index: i64) -> Result<(&[Point], bool), TopologyError> {
        let (slot, reversed) = if index < 0 { (!index, true) } else { (index, false) };
        usize::try_from(slot)
            .ok()
            .and_then(|slot| self.arcs.get(slot))
            .map(|arc| (arc.as_slice(), reversed))
            .ok_or(TopologyError::ArcOutOfRange {
                index,
                arcs: self.arcs.len(),
            })
    }

    /// Stitches arcs end to end, dropping each shared junction point once.
    fn stitch(&self, indices: &[i64]) -> Result<Vec<Point>, TopologyError> {
        let mut points: Vec<Point> = Vec::new();
        for &index in indices {
            let (arc, reversed) = self.arc(index)?;
            if !points.is_empty() {
                points.pop();
            }
            if reversed {
                points.extend(arc.iter().rev().copied());
            } else {
                points.extend_from_slice(arc);
            }
        }
        Ok(points)
    }

    fn line(&self, indices: &[i64]) -> Result<Vec<Point>, TopologyError> {
        let mut points = self.stitch(indices)?;
        // A line needs two points even when it degenerates to one.
        if points.len() == 1 {
            points.push(points[0]);
        }
        Ok(points)
    }

    fn polygon(&self, rings: &[Vec<i64>]) -> Result<Vec<Vec<Point>>, TopologyError> {
        rings
            .iter()
            .map(|ring| {
                let mut points = self.stitch(ring)?;
                if let Some(&first) = points.first() {
                    while points.len() < 4 {
                        points.push(first);
                    }
                }
                Ok(points)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two unit squares sharing the edge x = 1, quantized with scale 1 and a
    // (10, 20) translate. Arc 0 is the shared edge going up.
    const SQUARES: &str = r#"{
        "type": "Topology",
        "transform": { "scale": [1, 1], "translate": [10, 20] },
        "arcs": [
            [[1, 0], [0, 1]],
            [[1, 1], [-1, 0], [0, -1], [1, 0]],
            [[1, 0], [1, 0], [0, 1], [-1, 0]]
        ],
        "objects": {
            "cells": { "type": "GeometryCollection", "geometries": [
                { "type": "Polygon", "arcs": [[1, 0]], "id": "left" },
                { "type": "Polygon", "arcs": [[2, -1]], "id": "right", "properties": { "n": 1 } }
            ] }
        }
    }"#;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn delta_decoding_applies_transform() {
        let topology = Topology::from_json(SQUARES).unwrap();
        let arcs = decode_arcs(&topology);
        assert_eq!(arcs[0], pts(&[(11.0, 20.0), (11.0, 21.0)]));
        assert_eq!(
            arcs[1],
            pts(&[(11.0, 21.0), (10.0, 21.0), (10.0, 20.0), (11.0, 20.0)])
        );
    }

    #[test]
    fn rings_are_stitched_with_reversed_arcs() {
        let topology = Topology::from_json(SQUARES).unwrap();
        let features = first_feature_collection(&topology).unwrap();
        assert_eq!(features.len(), 2);

        assert_eq!(
            features[0].geometry,
            FeatureGeometry::Polygon(vec![pts(&[
                (11.0, 21.0),
                (10.0, 21.0),
                (10.0, 20.0),
                (11.0, 20.0),
                (11.0, 21.0),
            ])])
        );
        assert_eq!(
            features[1].geometry,
            FeatureGeometry::Polygon(vec![pts(&[
                (11.0, 20.0),
                (12.0, 20.0),
                (12.0, 21.0),
                (11.0, 21.0),
                (11.0, 20.0),
            ])])
        );
        assert_eq!(features[1].properties.get("n"), Some(&Value::from(1)));
    }

    #[test]
    fn centroid_of_squares_and_holes() {
        let topology = Topology::from_json(SQUARES).unwrap();
        let features = feature_collection(&topology, "cells").unwrap();
        assert_eq!(features[0].centroid(), Some(Point::new(10.5, 20.5)));
        assert_eq!(features[1].centroid(), Some(Point::new(11.5, 20.5)));

        // A 4x4 square with a 2x2 hole in its left half: the mass shifts right.
        let outer = pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]);
        let hole = pts(&[(0.0, 1.0), (2.0, 1.0), (2.0, 3.0), (0.0, 3.0), (0.0, 1.0)]);
        let centroid = FeatureGeometry::Polygon(vec![outer, hole]).centroid().unwrap();
        assert!((centroid.x - 7.0 / 3.0).abs() < 1e-9, "{centroid:?}");
        assert!((centroid.y - 2.0).abs() < 1e-9, "{centroid:?}");
    }

    #[test]
    fn centroid_without_area_uses_vertex_mean() {
        let line = FeatureGeometry::LineString(pts(&[(0.0, 0.0), (4.0, 2.0)]));
        assert_eq!(line.centroid(), Some(Point::new(2.0, 1.0)));
        assert_eq!(FeatureGeometry::Collection(Vec::new()).centroid(), None);
    }

    #[test]
    fn bad_references_are_errors() {
        let topology = Topology::from_json(
            r#"{ "arcs": [], "objects": { "a": { "type": "LineString", "arcs": [-3] } } }"#,
        )
        .unwrap();
        assert!(matches!(
            first_feature_collection(&topology),
            Err(TopologyError::ArcOutOfRange { index: -3, arcs: 0 })
        ));
        assert!(matches!(
            feature_collection(&topology, "b"),
            Err(TopologyError::MissingObject(name)) if name == "b"
        ));
        assert!(matches!(
            first_feature_collection(&Topology::default()),
            Err(TopologyError::NoObjects)
        ));
    }

    #[test]
    fn points_are_transformed_but_not_delta_decoded() {
        let topology = Topology::from_json(
            r#"{
                "transform": { "scale": [2, 2], "translate": [1, 1] },
                "arcs": [],
                "objects": { "p": { "type": "MultiPoint", "coordinates": [[1, 1], [1, 1]] } }
            }"#,
        )
        .unwrap();
        let features = first_feature_collection(&topology).unwrap();
        assert_eq!(
            features[0].geometry,
            FeatureGeometry::MultiPoint(pts(&[(3.0, 3.0), (3.0, 3.0)]))
        );
    }
}
