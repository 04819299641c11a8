// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dotted-path property access.
//!
//! Region ids are found through an id path such as `"id"` or
//! `"properties.iso_a3"`. A missing segment anywhere along the path is not an
//! error: the lookup simply yields `None`.

use serde_json::Value;

use crate::dataset::RegionId;
use crate::model::{Geometry, Record};

/// Anything that carries a geometry-style `id` and `properties`.
pub trait PropertySource {
    /// The direct identifier, if present.
    fn id(&self) -> Option<&Value>;
    /// The property record.
    fn properties(&self) -> &Record;
}

impl PropertySource for Geometry {
    fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    fn properties(&self) -> &Record {
        &self.properties
    }
}

/// Resolves a dotted `path` against `source`.
///
/// The first segment selects the root: `id` for the direct identifier or
/// `properties` for the property record. Remaining segments walk into nested
/// objects by key and into arrays by index.
///
/// `"properties"` on its own names the whole record, which is not a single
/// value, and yields `None`.
pub fn get_property<'a, S: PropertySource + ?Sized>(source: &'a S, path: &str) -> Option<&'a Value> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    match head {
        "id" => {
            let id = source.id()?;
            match rest {
                Some(rest) => resolve_path(id, rest),
                None => Some(id),
            }
        }
        "properties" => {
            let (key, tail) = match rest?.split_once('.') {
                Some((key, tail)) => (key, Some(tail)),
                None => (rest?, None),
            };
            let value = source.properties().get(key)?;
            match tail {
                Some(tail) => resolve_path(value, tail),
                None => Some(value),
            }
        }
        _ => None,
    }
}

/// Resolves a dotted `path` inside a JSON value.
pub fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Resolves the region id of `source` through `id_path`.
///
/// Returns `None` when the path is missing or the value cannot serve as an id
/// (see [`RegionId::from_value`]).
pub fn region_id<S: PropertySource + ?Sized>(source: &S, id_path: &str) -> Option<RegionId> {
    get_property(source, id_path).and_then(RegionId::from_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GeometryKind, Position};
    use serde_json::json;

    fn point() -> Geometry {
        Geometry::new(GeometryKind::Point {
            coordinates: Position::new(0.0, 0.0),
        })
    }

    #[test]
    fn direct_id_and_nested_properties() {
        let geometry = point()
            .with_id(7)
            .with_property("meta", json!({"codes": {"iso": "FRA"}, "alt": ["x", "y"]}));

        assert_eq!(get_property(&geometry, "id"), Some(&json!(7)));
        assert_eq!(
            get_property(&geometry, "properties.meta.codes.iso"),
            Some(&json!("FRA"))
        );
        assert_eq!(get_property(&geometry, "properties.meta.alt.1"), Some(&json!("y")));
    }

    #[test]
    fn missing_segments_yield_none() {
        let geometry = point().with_property("name", "Lyon");
        assert_eq!(get_property(&geometry, "id"), None);
        assert_eq!(get_property(&geometry, "properties"), None);
        assert_eq!(get_property(&geometry, "properties.name.first"), None);
        assert_eq!(get_property(&geometry, "properties.nope"), None);
        assert_eq!(get_property(&geometry, "geometry.type"), None);
    }

    #[test]
    fn region_id_accepts_zero() {
        let geometry = point().with_property("code", 0);
        assert_eq!(
            region_id(&geometry, "properties.code"),
            Some(RegionId::from("0"))
        );
        let blank = point().with_property("code", "");
        assert_eq!(region_id(&blank, "properties.code"), None);
    }
}
