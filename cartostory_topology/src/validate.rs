// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Advisory validation of topology ids and dataset coverage.
//!
//! Validation exists to help developers spot mismatched inputs early. It never
//! blocks rendering: the heatmap draws regardless and falls back to a zero
//! value and an id-only label for anything missing.
//!
//! The `validate_*` functions walk their input in declaration order and stop
//! at the first problem, which is logged and returned. The `collect_*`
//! functions report every problem instead and do not log.
//!
//! Only members of top-level `GeometryCollection` objects are checked.

use core::fmt;

use crate::dataset::{DataEntry, Dataset, RegionId};
use crate::model::{Record, Topology};
use crate::property::region_id;

/// A single validation finding.
#[derive(Clone, Debug, PartialEq)]
pub enum Violation {
    /// A geometry's id path does not resolve to a usable id.
    MissingId {
        /// Name of the collection holding the geometry.
        object: String,
        /// The id path that was consulted.
        id_path: String,
        /// The geometry's raw properties, to help locate it.
        properties: Record,
    },
    /// The dataset has no entry for a geometry id.
    MissingDataKey {
        /// The geometry id without data.
        id: RegionId,
    },
    /// The dataset entry for an id lacks the required value key.
    MissingValueKey {
        /// The geometry id.
        id: RegionId,
        /// The required field name.
        value_key: String,
    },
    /// The metadata has no entry for a dataset id.
    MissingMetadataKey {
        /// The dataset id without metadata.
        id: RegionId,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingId {
                id_path,
                properties,
                ..
            } => write!(
                f,
                "geometry with properties {} is missing the \"{id_path}\" attribute",
                serde_json::to_string(properties).unwrap_or_default()
            ),
            Self::MissingDataKey { id } => write!(f, "key \"{id}\" not found in data object"),
            Self::MissingValueKey { id, value_key } => write!(
                f,
                "property \"{value_key}\" not found in data entry for key \"{id}\""
            ),
            Self::MissingMetadataKey { id } => {
                write!(f, "key \"{id}\" not found in metadata object")
            }
        }
    }
}

impl core::error::Error for Violation {}

/// Checks that every geometry resolves a usable id through `id_path`.
///
/// Logs the first failure at error level.
pub fn validate_geometries_have_id(topology: &Topology, id_path: &str) -> Result<(), Violation> {
    match id_violations(topology, id_path).next() {
        Some(violation) => {
            log::error!("{violation}");
            Err(violation)
        }
        None => Ok(()),
    }
}

/// Checks that `data` has an entry for every geometry id and, when
/// `value_key` is given, that each such entry carries that key.
///
/// A geometry without a usable id also fails this check. Logs the first failure
/// at warning level. Extra dataset entries are fine.
pub fn validate_data_keys(
    topology: &Topology,
    data: &Dataset<DataEntry>,
    id_path: &str,
    value_key: Option<&str>,
) -> Result<(), Violation> {
    match coverage_violations(topology, data, id_path, value_key).next() {
        Some(violation) => {
            log::warn!("{violation}");
            Err(violation)
        }
        None => Ok(()),
    }
}

/// Checks that `metadata` has an entry for every id in `data`.
///
/// Logs the first failure at warning level.
pub fn validate_metadata_keys<T, M>(
    data: &Dataset<T>,
    metadata: &Dataset<M>,
) -> Result<(), Violation> {
    match metadata_violations(data, metadata).next() {
        Some(violation) => {
            log::warn!("{violation}");
            Err(violation)
        }
        None => Ok(()),
    }
}

/// Reports every id and coverage violation, in declaration order.
///
/// A geometry without a usable id is reported once.
pub fn collect_violations(
    topology: &Topology,
    data: &Dataset<DataEntry>,
    id_path: &str,
    value_key: Option<&str>,
) -> Vec<Violation> {
    coverage_violations(topology, data, id_path, value_key).collect()
}

/// Reports every dataset id that has no metadata entry.
pub fn collect_metadata_violations<T, M>(data: &Dataset<T>, metadata: &Dataset<M>) -> Vec<Violation> {
    metadata_violations(data, metadata).collect()
}

fn id_violations<'a>(
    topology: &'a Topology,
    id_path: &'a str,
) -> impl Iterator<Item = Violation> + 'a {
    topology
        .collection_members()
        .filter(move |(_, geometry)| region_id(*geometry, id_path).is_none())
        .map(move |(object, geometry)| Violation::MissingId {
            object: object.into(),
            id_path: id_path.into(),
            properties: geometry.properties.clone(),
        })
}

fn coverage_violations<'a>(
    topology: &'a Topology,
    data: &'a Dataset<DataEntry>,
    id_path: &'a str,
    value_key: Option<&'a str>,
) -> impl Iterator<Item = Violation> + 'a {
    topology
        .collection_members()
        .filter_map(move |(object, geometry)| {
            let Some(id) = region_id(geometry, id_path) else {
                return Some(Violation::MissingId {
                    object: object.into(),
                    id_path: id_path.into(),
                    properties: geometry.properties.clone(),
                });
            };
            let Some(entry) = data.get(id.as_str()) else {
                return Some(Violation::MissingDataKey { id });
            };
            match value_key {
                Some(key) if !entry.has_key(key) => Some(Violation::MissingValueKey {
                    id,
                    value_key: key.into(),
                }),
                _ => None,
            }
        })
}

fn metadata_violations<'a, T, M>(
    data: &'a Dataset<T>,
    metadata: &'a Dataset<M>,
) -> impl Iterator<Item = Violation> + 'a {
    data.ids()
        .filter(move |id| !metadata.contains_key(id.as_str()))
        .map(|id| Violation::MissingMetadataKey { id: id.clone() })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: &str = r#"{
        "type": "Topology",
        "arcs": [],
        "objects": {
            "states": { "type": "GeometryCollection", "geometries": [
                { "type": "Point", "coordinates": [0, 0], "id": "A", "properties": { "code": 0 } },
                { "type": "Point", "coordinates": [1, 0], "id": "B", "properties": { "code": 1 } }
            ] },
            "towns": { "type": "GeometryCollection", "geometries": [
                { "type": "Point", "coordinates": [2, 0], "id": "C", "properties": { "code": 2 } }
            ] },
            "outline": { "type": "Point", "coordinates": [3, 0] }
        }
    }"#;

    fn topology() -> Topology {
        Topology::from_json(STATES).unwrap()
    }

    fn data(json: &str) -> Dataset<DataEntry> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn ids_resolve_including_zero() {
        let topology = topology();
        assert!(validate_geometries_have_id(&topology, "id").is_ok());
        assert!(validate_geometries_have_id(&topology, "properties.code").is_ok());
    }

    #[test]
    fn first_missing_id_is_reported() {
        let err = validate_geometries_have_id(&topology(), "properties.name").unwrap_err();
        let Violation::MissingId {
            object, properties, ..
        } = err
        else {
            panic!("expected a missing id");
        };
        assert_eq!(object, "states");
        assert_eq!(properties.get("code"), Some(&serde_json::json!(0)));
    }

    #[test]
    fn full_coverage_passes_and_extras_are_fine() {
        let data = data(r#"{ "A": {"v": 1}, "B": {"v": 2}, "C": {"v": 3}, "Z": {"v": 9} }"#);
        assert!(validate_data_keys(&topology(), &data, "id", Some("v")).is_ok());
        assert!(validate_data_keys(&topology(), &data, "id", None).is_ok());
    }

    #[test]
    fn missing_entry_is_reported_left_to_right() {
        let data = data(r#"{ "A": {"v": 1}, "C": {"v": 3} }"#);
        assert_eq!(
            validate_data_keys(&topology(), &data, "id", Some("v")),
            Err(Violation::MissingDataKey { id: "B".into() })
        );
    }

    #[test]
    fn missing_value_key_is_reported() {
        let data = data(r#"{ "A": {"v": 1}, "B": {"w": 2}, "C": {"v": 3} }"#);
        assert_eq!(
            validate_data_keys(&topology(), &data, "id", Some("v")),
            Err(Violation::MissingValueKey {
                id: "B".into(),
                value_key: "v".into(),
            })
        );
        assert!(validate_data_keys(&topology(), &data, "id", None).is_ok());
    }

    #[test]
    fn direct_values_lack_any_value_key() {
        let data = data(r#"{ "A": 1, "B": 2, "C": 3 }"#);
        assert!(validate_data_keys(&topology(), &data, "id", None).is_ok());
        assert!(validate_data_keys(&topology(), &data, "id", Some("v")).is_err());
    }

    #[test]
    fn numeric_ids_match_string_keys() {
        let data = data(r#"{ "0": 1, "1": 2, "2": 3 }"#);
        assert!(validate_data_keys(&topology(), &data, "properties.code", None).is_ok());
    }

    #[test]
    fn metadata_coverage() {
        let values: Dataset<f64> = [("A", 1.0), ("B", 2.0)].into_iter().collect();
        let full: Dataset<&str> = [("B", "b"), ("A", "a")].into_iter().collect();
        let partial: Dataset<&str> = [("B", "b")].into_iter().collect();

        assert!(validate_metadata_keys(&values, &full).is_ok());
        assert_eq!(
            validate_metadata_keys(&values, &partial),
            Err(Violation::MissingMetadataKey { id: "A".into() })
        );
    }

    #[test]
    fn collect_reports_every_violation() {
        let data = data(r#"{ "B": {"w": 2} }"#);
        let report = collect_violations(&topology(), &data, "id", Some("v"));
        assert_eq!(
            report,
            vec![
                Violation::MissingDataKey { id: "A".into() },
                Violation::MissingValueKey {
                    id: "B".into(),
                    value_key: "v".into(),
                },
                Violation::MissingDataKey { id: "C".into() },
            ]
        );

        let values: Dataset<f64> = [("A", 1.0), ("B", 2.0)].into_iter().collect();
        let none: Dataset<()> = Dataset::new();
        assert_eq!(collect_metadata_violations(&values, &none).len(), 2);
    }

    #[test]
    fn messages_name_the_offender() {
        let violation = Violation::MissingValueKey {
            id: "B".into(),
            value_key: "v".into(),
        };
        assert_eq!(
            violation.to_string(),
            "property \"v\" not found in data entry for key \"B\""
        );
    }
}
