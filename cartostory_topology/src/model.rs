// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! TopoJSON topology types.

use core::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::TopologyError;

/// A JSON object of named fields.
///
/// Used for geometry `properties` and for value-keyed dataset entries.
pub type Record = serde_json::Map<String, Value>;

/// A decoded TopoJSON topology.
///
/// The topology is an immutable input: nothing in Cartostory mutates it after
/// parsing. Objects keep the order in which they appear in the source document,
/// which is the order validation walks them in.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Topology {
    /// Optional quantization transform applied to arcs and point coordinates.
    #[serde(default)]
    pub transform: Option<Transform>,
    /// Optional bounding box as declared by the producer.
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
    /// Shared arcs referenced by index from line and polygon geometries.
    #[serde(default)]
    pub arcs: Vec<Vec<Position>>,
    /// Named top-level geometry objects.
    pub objects: Objects,
}

impl Topology {
    /// Creates a topology from absolute (non-quantized) arcs and a set of objects.
    #[must_use]
    pub fn new(arcs: Vec<Vec<Position>>, objects: Objects) -> Self {
        Self {
            transform: None,
            bbox: None,
            arcs,
            objects,
        }
    }

    /// Parses a topology from TopoJSON text.
    pub fn from_json(text: &str) -> Result<Self, TopologyError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Returns the first declared object, if any.
    ///
    /// The heatmap renders the regions of this object.
    #[must_use]
    pub fn first_object(&self) -> Option<(&str, &Geometry)> {
        self.objects.iter().next()
    }

    /// Iterates over the members of every top-level `GeometryCollection`, in
    /// declaration order, paired with the name of the collection they belong to.
    ///
    /// Top-level objects that are not collections are skipped.
    pub fn collection_members(&self) -> impl Iterator<Item = (&str, &Geometry)> {
        self.objects.iter().flat_map(|(name, object)| {
            let members: &[Geometry] = match &object.kind {
                GeometryKind::GeometryCollection { geometries } => geometries,
                _ => &[],
            };
            members.iter().map(move |geometry| (name, geometry))
        })
    }
}

/// Quantization transform: `position * scale + translate`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Transform {
    /// Per-axis scale.
    pub scale: [f64; 2],
    /// Per-axis translation.
    pub translate: [f64; 2],
}

/// A TopoJSON position.
///
/// Only the first two components (x/longitude, y/latitude) are kept; any extra
/// components in the source are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "Vec<f64>")]
pub struct Position(pub [f64; 2]);

impl Position {
    /// Creates a position from its two components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self([x, y])
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(components: Vec<f64>) -> Result<Self, Self::Error> {
        match components.as_slice() {
            [x, y, ..] => Ok(Self([*x, *y])),
            _ => Err(format!(
                "position needs at least 2 components, found {}",
                components.len()
            )),
        }
    }
}

/// Named top-level objects of a topology, in document order.
#[derive(Clone, Debug, Default)]
pub struct Objects {
    entries: Vec<(String, Geometry)>,
}

impl Objects {
    /// Creates an empty object set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a named object.
    pub fn push(&mut self, name: impl Into<String>, geometry: Geometry) {
        self.entries.push((name.into(), geometry));
    }

    /// Returns the object with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Geometry> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, geometry)| geometry)
    }

    /// Returns the number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, object)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Geometry)> {
        self.entries
            .iter()
            .map(|(name, geometry)| (name.as_str(), geometry))
    }
}

impl<N: Into<String>> FromIterator<(N, Geometry)> for Objects {
    fn from_iter<I: IntoIterator<Item = (N, Geometry)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, geometry)| (name.into(), geometry))
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for Objects {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ObjectsVisitor;

        impl<'de> Visitor<'de> for ObjectsVisitor {
            type Value = Objects;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of named TopoJSON objects")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Objects, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, geometry)) = map.next_entry::<String, Geometry>()? {
                    entries.push((name, geometry));
                }
                Ok(Objects { entries })
            }
        }

        deserializer.deserialize_map(ObjectsVisitor)
    }
}

/// A TopoJSON geometry object.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Geometry {
    /// Geometry type and its arc references or coordinates.
    #[serde(flatten)]
    pub kind: GeometryKind,
    /// Optional direct identifier.
    #[serde(default)]
    pub id: Option<Value>,
    /// Free-form properties. A `null` in the source reads as empty.
    #[serde(default, deserialize_with = "nullable_record")]
    pub properties: Record,
}

impl Geometry {
    /// Creates a geometry with no id and no properties.
    #[must_use]
    pub fn new(kind: GeometryKind) -> Self {
        Self {
            kind,
            id: None,
            properties: Record::new(),
        }
    }

    /// Sets the direct identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets a single property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Returns the TopoJSON type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            GeometryKind::Point { .. } => "Point",
            GeometryKind::MultiPoint { .. } => "MultiPoint",
            GeometryKind::LineString { .. } => "LineString",
            GeometryKind::MultiLineString { .. } => "MultiLineString",
            GeometryKind::Polygon { .. } => "Polygon",
            GeometryKind::MultiPolygon { .. } => "MultiPolygon",
            GeometryKind::GeometryCollection { .. } => "GeometryCollection",
        }
    }
}

/// Geometry payload keyed by the TopoJSON `type` tag.
///
/// Arc references follow the TopoJSON convention: a negative index `i` refers
/// to arc `!i` traversed in reverse.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type")]
#[allow(missing_docs, reason = "variant fields mirror the TopoJSON members")]
pub enum GeometryKind {
    /// A single position.
    Point { coordinates: Position },
    /// Several positions.
    MultiPoint { coordinates: Vec<Position> },
    /// A line made of stitched arcs.
    LineString { arcs: Vec<i64> },
    /// Several lines.
    MultiLineString { arcs: Vec<Vec<i64>> },
    /// Rings of stitched arcs; the first ring is the exterior.
    Polygon { arcs: Vec<Vec<i64>> },
    /// Several polygons.
    MultiPolygon { arcs: Vec<Vec<Vec<i64>>> },
    /// Nested geometries.
    GeometryCollection { geometries: Vec<Geometry> },
}

fn nullable_record<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Record, D::Error> {
    Option::<Record>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_OBJECTS: &str = r#"{
        "type": "Topology",
        "transform": { "scale": [0.5, 0.5], "translate": [10, 20] },
        "arcs": [[[0, 0, 7], [2, 0]]],
        "objects": {
            "zeta": { "type": "GeometryCollection", "geometries": [
                { "type": "LineString", "arcs": [0], "properties": null },
                { "type": "Point", "coordinates": [1, 1], "id": 0 }
            ] },
            "alpha": { "type": "Point", "coordinates": [0, 0] }
        }
    }"#;

    #[test]
    fn objects_keep_document_order() {
        let topology = Topology::from_json(TWO_OBJECTS).unwrap();
        let names: Vec<&str> = topology.objects.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["zeta", "alpha"]);
        assert_eq!(topology.first_object().map(|(name, _)| name), Some("zeta"));
    }

    #[test]
    fn geometry_fields_and_extra_components() {
        let topology = Topology::from_json(TWO_OBJECTS).unwrap();
        assert_eq!(topology.arcs[0][0], Position::new(0.0, 0.0));
        assert_eq!(
            topology.transform,
            Some(Transform {
                scale: [0.5, 0.5],
                translate: [10.0, 20.0],
            })
        );

        let members: Vec<&Geometry> = topology.collection_members().map(|(_, g)| g).collect();
        assert_eq!(members.len(), 2);
        assert!(members[0].properties.is_empty());
        assert_eq!(members[0].type_name(), "LineString");
        assert_eq!(members[1].id, Some(Value::from(0)));
    }

    #[test]
    fn collection_members_skip_plain_objects() {
        let topology = Topology::from_json(TWO_OBJECTS).unwrap();
        assert!(
            topology
                .collection_members()
                .all(|(name, _)| name == "zeta")
        );
    }

    #[test]
    fn short_position_is_rejected() {
        let err = Topology::from_json(
            r#"{ "objects": { "a": { "type": "Point", "coordinates": [1] } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, TopologyError::Json(_)));
    }
}
